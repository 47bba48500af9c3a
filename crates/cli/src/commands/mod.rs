pub mod backup;
pub mod evaluate;
pub mod events;
pub mod reset;
pub mod restore;
pub mod status;
pub mod summary;
pub mod transfer;
