/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 * - "no rows" とそれ以外の失敗を必ず区別する
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("no rows")]
    NotFound,
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("expected one row, found {0}")]
    TooManyRows(usize),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("db error: {0}")]
    Db(#[source] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                RepoError::Unavailable(e.to_string())
            }
            sqlx::Error::Database(dbe) if dbe.code().as_deref() == Some("23505") => {
                RepoError::UniqueViolation(dbe.constraint().unwrap_or_default().to_string())
            }
            other => RepoError::Db(other),
        }
    }
}

/// Collapse a query that should match at most one row.
pub fn expect_one<T>(mut rows: Vec<T>) -> RepoResult<T> {
    match rows.len() {
        0 => Err(RepoError::NotFound),
        1 => Ok(rows.remove(0)),
        n => Err(RepoError::TooManyRows(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expect_one_maps_empty_to_not_found() {
        let err = expect_one::<u8>(vec![]).unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[test]
    fn expect_one_returns_single_row() {
        assert_eq!(expect_one(vec![7]).unwrap(), 7);
    }

    #[test]
    fn expect_one_rejects_duplicates() {
        let err = expect_one(vec![1, 2]).unwrap_err();
        assert!(matches!(err, RepoError::TooManyRows(2)));
    }

    #[test]
    fn row_not_found_is_classified() {
        assert!(matches!(
            RepoError::from_sqlx(sqlx::Error::RowNotFound),
            RepoError::NotFound
        ));
        assert!(matches!(
            RepoError::from_sqlx(sqlx::Error::PoolTimedOut),
            RepoError::Unavailable(_)
        ));
    }
}
