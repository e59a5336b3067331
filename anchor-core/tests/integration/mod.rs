mod anchor_flow;
mod config_loading;
mod settings_update;
