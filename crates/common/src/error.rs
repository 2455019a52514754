/// Error types that can be built from a plain message string.
///
/// Implement this for a crate's error type, then invoke [`impl_context!`]
/// with that type to get `.context()` and `.with_context()` on `Result` and
/// `Option`.
pub trait FromMessage: Sized {
    fn from_message(message: String) -> Self;
}

/// Generate a module-local `Context` trait converting foreign errors and
/// missing values into `$err`.
///
/// ```ignore
/// // in crates/config/src/error.rs
/// gallery_saver_common::impl_context!(Error);
/// ```
#[macro_export]
macro_rules! impl_context {
    ($err:ty) => {
        pub trait Context<T> {
            fn context(self, context: impl Into<String>) -> std::result::Result<T, $err>;
            fn with_context<C, F>(self, f: F) -> std::result::Result<T, $err>
            where
                C: Into<String>,
                F: FnOnce() -> C;
        }

        impl<T, E: std::fmt::Display> Context<T> for std::result::Result<T, E> {
            fn context(self, context: impl Into<String>) -> std::result::Result<T, $err> {
                self.with_context(|| context)
            }

            fn with_context<C, F>(self, f: F) -> std::result::Result<T, $err>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.map_err(|source| {
                    let ctx: String = f().into();
                    <$err as $crate::FromMessage>::from_message(format!("{ctx}: {source}"))
                })
            }
        }

        impl<T> Context<T> for Option<T> {
            fn context(self, context: impl Into<String>) -> std::result::Result<T, $err> {
                self.with_context(|| context)
            }

            fn with_context<C, F>(self, f: F) -> std::result::Result<T, $err>
            where
                C: Into<String>,
                F: FnOnce() -> C,
            {
                self.ok_or_else(|| <$err as $crate::FromMessage>::from_message(f().into()))
            }
        }
    };
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    mod ctx {
        #[derive(Debug, thiserror::Error)]
        #[error("{0}")]
        pub struct Error(pub String);

        impl crate::FromMessage for Error {
            fn from_message(message: String) -> Self {
                Self(message)
            }
        }

        crate::impl_context!(Error);
    }

    use ctx::Context;

    #[test]
    fn result_context_prefixes_message() {
        let failed: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));
        let err = failed.context("writing album").unwrap_err();
        assert_eq!(err.to_string(), "writing album: disk full");
    }

    #[test]
    fn option_context_uses_message() {
        let missing: Option<u8> = None;
        let err = missing.with_context(|| "no extension").unwrap_err();
        assert_eq!(err.0, "no extension");
    }

    #[test]
    fn ok_values_pass_through() {
        let ok: Result<u8, std::io::Error> = Ok(7);
        assert_eq!(ok.context("unused").unwrap(), 7);
        assert_eq!(Some(3).context("unused").unwrap(), 3);
    }
}
