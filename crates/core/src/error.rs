use thiserror::Error;

use crate::model::{CatalogError, ParseIdError, StudentError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] ParseIdError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Student(#[from] StudentError),
}
