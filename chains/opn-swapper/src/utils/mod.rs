pub mod gas;
