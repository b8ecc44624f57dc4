pub(crate) mod algebra;
pub(crate) mod consequences;
pub(crate) mod helpers;
pub(crate) mod inspect;
pub(crate) mod query;
pub(crate) mod team;
