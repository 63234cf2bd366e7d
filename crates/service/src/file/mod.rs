pub mod route_store;
