pub mod portrait_state;
