//! Per-evaluation quota tracking.

use crate::config::EngineConfig;
use crate::errors::EngineError;

/// Counters checked against the engine's quotas as evaluation proceeds.
#[derive(Debug)]
pub(super) struct Budget {
    max_directives: usize,
    max_depth: usize,
    max_effect_calls: usize,
    max_output_len: usize,
    directives: usize,
    effect_calls: usize,
}

impl Budget {
    pub(super) fn new(config: &EngineConfig) -> Self {
        Budget {
            max_directives: config.max_directives,
            max_depth: config.max_depth,
            max_effect_calls: config.max_effect_calls,
            max_output_len: config.max_output_len,
            directives: 0,
            effect_calls: 0,
        }
    }

    /// Count one more directive.
    pub(super) fn enter_directive(&mut self) -> Result<(), EngineError> {
        self.directives += 1;
        if self.directives > self.max_directives {
            return Err(EngineError::DirectiveQuotaExceeded {
                limit: self.max_directives,
            });
        }
        Ok(())
    }

    /// `depth` counts enclosing nested expressions; a directive is depth 0.
    pub(super) fn check_depth(&self, depth: usize) -> Result<(), EngineError> {
        if depth > self.max_depth {
            return Err(EngineError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Count one more effecting call.
    pub(super) fn charge_effect(&mut self) -> Result<(), EngineError> {
        self.effect_calls += 1;
        if self.effect_calls > self.max_effect_calls {
            return Err(EngineError::EffectQuotaExceeded {
                limit: self.max_effect_calls,
            });
        }
        Ok(())
    }

    pub(super) fn check_output(&self, len: usize) -> Result<(), EngineError> {
        if len > self.max_output_len {
            return Err(self.too_large());
        }
        Ok(())
    }

    /// Bytes a directive may still render once `used` bytes are written.
    pub(super) fn remaining_output(&self, used: usize) -> usize {
        self.max_output_len.saturating_sub(used)
    }

    pub(super) fn too_large(&self) -> EngineError {
        EngineError::OutputTooLarge {
            limit: self.max_output_len,
        }
    }

    pub(super) fn effect_calls(&self) -> usize {
        self.effect_calls
    }
}
