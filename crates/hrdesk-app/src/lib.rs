// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod columns;
pub mod date_codec;
pub mod forms;
pub mod gateway;
pub mod schema;
pub mod search;
pub mod state;
pub mod validation;
pub mod value;
pub mod view;

pub use columns::*;
pub use forms::*;
pub use gateway::*;
pub use schema::*;
pub use state::*;
pub use validation::*;
pub use value::*;
pub use view::*;
