/*
Copyright 2021 Robin Marchart

   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at

       http://www.apache.org/licenses/LICENSE-2.0

   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

//! Runs dice expressions for a concurrent caller: request-scoped generators,
//! a bounded worker pool, a per-roll timeout and the TOML configuration for all of it.

pub mod config;
pub mod rolls;

pub use config::RollConfig;
pub use dice_expr::{Evaluation, RollError};
pub use rolls::{wait_stop, RollExecutor, RollFailure};
