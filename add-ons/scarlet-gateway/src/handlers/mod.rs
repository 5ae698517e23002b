mod chat;
mod records;

pub(crate) use chat::{chat, reload};
pub(crate) use records::{add_catalog_entry, learn};
