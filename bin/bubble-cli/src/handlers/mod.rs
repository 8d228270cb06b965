pub(crate) mod encode;
pub(crate) mod key;
pub(crate) mod simulate;
