pub(crate) mod catalog;
pub(crate) mod configure;
pub(crate) mod migrate;
pub(crate) mod serve;
pub(crate) mod shared;
pub(crate) mod sync;
