// Domain layer - Core business logic

pub mod model;
