use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

fn default_size() -> i64 {
    20
}

/// Offset window over a listing: `from` rows skipped, at most `size` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    #[serde(default)]
    #[validate(range(min = 0, message = "must be greater than or equal to 0"))]
    #[param(minimum = 0, default = 0)]
    pub from: i64,

    #[serde(default = "default_size")]
    #[validate(range(min = 1, message = "must be greater than or equal to 1"))]
    #[param(minimum = 1, default = 20)]
    pub size: i64,
}

impl PageParams {
    pub fn new(from: i64, size: i64) -> Self {
        Self { from, size }
    }

    pub fn offset(&self) -> u64 {
        self.from.max(0) as u64
    }

    pub fn limit(&self) -> u64 {
        self.size.max(1) as u64
    }

    /// Applies the window to an already ordered sequence.
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect()
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            from: 0,
            size: default_size(),
        }
    }
}
