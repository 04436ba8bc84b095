pub mod portrait_service;
