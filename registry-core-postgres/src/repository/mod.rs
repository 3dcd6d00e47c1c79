pub mod db_init;
pub mod equipment;
pub mod site;
