pub mod agent;
pub mod fix_desktop;
pub mod install;
pub mod uninstall;
