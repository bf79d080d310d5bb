use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("place not found: {0}")]
    NotFound(String),
    #[error("invalid stored row: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = StoreError::NotFound("abc".to_string());
        assert_eq!(format!("{err}"), "place not found: abc");

        let err = StoreError::Corrupt("bad uuid".to_string());
        assert_eq!(format!("{err}"), "invalid stored row: bad uuid");
    }
}
