//! Result-set size guard

use super::RetrievalError;

/// Fail with [`RetrievalError::TooManyPages`] when `total_page_count` reaches `ceiling`
pub fn check_within_limit(total_page_count: u32, ceiling: u32) -> Result<(), RetrievalError> {
    if total_page_count >= ceiling {
        return Err(RetrievalError::TooManyPages {
            total_pages: total_page_count,
            ceiling,
        });
    }
    Ok(())
}
