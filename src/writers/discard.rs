//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Lu.
//! The Lu project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

use crate::errors::Result;
use crate::record::LuRecord;
use crate::writer::LuWriter;

/// Accepts every call and persists nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct LuDiscardWriter;

impl LuDiscardWriter {
    pub fn new() -> Self {
        LuDiscardWriter
    }
}

impl LuWriter for LuDiscardWriter {
    fn write(&mut self, _record: &dyn LuRecord) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        Ok(())
    }
}
