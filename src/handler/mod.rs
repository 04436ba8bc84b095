pub mod portrait_handler;
