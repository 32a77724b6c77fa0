use crate::directory::HandleDiagnostics;
use crate::error::{LdapError, Result};


/// Turns the failure state of a handle into a human-readable message.
pub trait BuildErrorMessage: Send + Sync {
    fn build(&self, handle: &dyn HandleDiagnostics) -> Result<String>;
}


/// Renders `<code>: <short message>. <extended message>.`
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ErrorMessageBuilder;
impl BuildErrorMessage for ErrorMessageBuilder {
    fn build(&self, handle: &dyn HandleDiagnostics) -> Result<String> {
        if !handle.is_valid() {
            return Err(LdapError::InvalidHandle);
        }
        Ok(handle.last_error().to_string())
    }
}


#[cfg(test)]
mod tests {
    use super::{BuildErrorMessage, ErrorMessageBuilder};
    use crate::directory::{Diagnostic, HandleDiagnostics};
    use crate::error::LdapError;

    struct FixedHandle {
        valid: bool,
    }
    impl HandleDiagnostics for FixedHandle {
        fn is_valid(&self) -> bool { self.valid }
        fn last_error(&self) -> Diagnostic {
            Diagnostic::new(32, "No such object", "0000208D: NameErr: DSID-03100241")
        }
    }

    #[test]
    fn test_build() {
        let message = ErrorMessageBuilder.build(&FixedHandle { valid: true }).unwrap();
        assert_eq!(message, "32: No such object. 0000208D: NameErr: DSID-03100241.");
    }

    #[test]
    fn test_build_rejects_invalid_handle() {
        assert!(matches!(
            ErrorMessageBuilder.build(&FixedHandle { valid: false }),
            Err(LdapError::InvalidHandle),
        ));
    }
}
