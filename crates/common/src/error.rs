use std::fmt::{Display, Formatter};

pub type CommonResult<T> = Result<T, CommonError>;

#[derive(Debug)]
pub struct CommonError(pub anyhow::Error);

impl Display for CommonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl<T> From<T> for CommonError
where
    T: Into<anyhow::Error>,
{
    fn from(t: T) -> Self {
        CommonError(t.into())
    }
}
