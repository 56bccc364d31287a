//! Result type alias for the harvester
//!
//! This module provides a convenient Result type alias that uses HarvesterError
//! as the error type.

use super::errors::HarvesterError;

/// Result type alias for harvester operations
///
/// # Examples
///
/// ```
/// use flickr_harvester::domain::result::Result;
/// use flickr_harvester::domain::errors::HarvesterError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HarvesterError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HarvesterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::HarvesterError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(HarvesterError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
