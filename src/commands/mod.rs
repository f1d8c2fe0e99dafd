pub type CmdResult<T> = wp_psr4::Result<(T, i32)>;

pub mod migrate;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (wp_psr4::Result<serde_json::Value>, i32) {
    crate::tty::status("wp-psr4 is working...");

    match command {
        crate::Commands::Migrate(args) => dispatch!(args, migrate),
    }
}
