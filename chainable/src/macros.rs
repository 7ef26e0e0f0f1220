/// Runs a list of steps on a [`Link`](crate::Link), stopping at the first error.
///
/// Each step is an identifier, optionally followed by arguments in
/// parentheses. Arguments go through `Value::from`.
///
/// ```rust
/// use chainable::prelude::*;
///
/// let words = chain!(chain("hello world"), upcase, split(" ")).unwrap();
///
/// assert_eq!(words.unwrap(), json!(["HELLO", "WORLD"]));
/// ```
#[macro_export]
macro_rules! chain {
    ($link:expr $(, $name:ident $( ( $($arg:expr),* $(,)? ) )? )* $(,)?) => {{
        let link: ::std::result::Result<$crate::Link, $crate::ChainError> = Ok($link);
        $(
            let link = link.and_then(|link| {
                link.call(
                    stringify!($name),
                    vec![$($($crate::valu3::value::Value::from($arg)),*)?],
                )
            });
        )*
        link
    }};
}
