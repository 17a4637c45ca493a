//! Types for the PostgrestClient

/// What the server sends back after a write
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnOption {
    /// The affected rows
    Representation,

    /// Nothing
    Minimal,
}

impl ReturnOption {
    /// Value for the `Prefer` header
    pub fn prefer(&self) -> &'static str {
        match self {
            ReturnOption::Representation => "return=representation",
            ReturnOption::Minimal => "return=minimal",
        }
    }
}

/// Sort direction for `order`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}
