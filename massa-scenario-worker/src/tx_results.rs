// Copyright (c) 2022 MASSA LABS <info@massa.net>

use num::BigUint;

use massa_scenario_exports::ScenarioError;
use massa_scenario_models::transaction::{CheckLogEntry, CheckLogs, TxExpectedResult};
use massa_scenario_models::vm::{LogEntry, VmOutput};
use massa_scenario_models::ReconstructorHint;

use crate::executor::ScenarioExecutor;

impl ScenarioExecutor {
    /// Compares the output of a transaction with its `expect` section,
    /// stopping at the first mismatch
    pub(crate) fn check_tx_results(
        &self,
        tx_id: &str,
        expected: &TxExpectedResult,
        output: &VmOutput,
    ) -> Result<(), ScenarioError> {
        let code = output.return_code.code();
        if !expected.status.check(&BigUint::from(code)) {
            return Err(ScenarioError::ExecutionError(format!(
                "result code mismatch. Tx {}. Want: {}. Have: {} ({}). Message: {}",
                tx_id,
                expected.status.original_str(),
                code,
                output.return_code,
                output.return_message
            )));
        }

        if !expected.message.check(output.return_message.as_bytes()) {
            return Err(ScenarioError::ExecutionError(format!(
                "result message mismatch. Tx {}. Want: {}. Have: {}",
                tx_id,
                expected.message.original_str(),
                output.return_message
            )));
        }

        if !expected.out.is_unspecified() && !expected.out.check_list(&output.return_data) {
            return Err(ScenarioError::ExecutionError(format!(
                "result mismatch. Tx {}. Want: [{}]. Have: {}",
                tx_id,
                expected.out.elements_json(),
                self.reconstructor
                    .reconstruct_list(&output.return_data, ReconstructorHint::NoHint)
            )));
        }

        if !expected.refund.check(&output.gas_refund) {
            return Err(ScenarioError::ExecutionError(format!(
                "result gas refund mismatch. Tx {}. Want: {}. Have: 0x{:x}",
                tx_id,
                expected.refund.original_str(),
                output.gas_refund
            )));
        }

        if self.check_gas && !expected.gas.check(&output.gas_remaining) {
            return Err(ScenarioError::ExecutionError(format!(
                "result gas mismatch. Tx {}. Want: {}. Got: {} (0x{:x})",
                tx_id,
                expected.gas.original_str(),
                output.gas_remaining,
                output.gas_remaining
            )));
        }

        self.check_tx_logs(tx_id, &expected.logs, &output.logs)
    }

    fn check_tx_logs(
        &self,
        tx_id: &str,
        expected: &CheckLogs,
        logs: &[LogEntry],
    ) -> Result<(), ScenarioError> {
        let (entries, more_allowed_at_end) = match expected {
            CheckLogs::Unspecified | CheckLogs::Star => return Ok(()),
            CheckLogs::List {
                entries,
                more_allowed_at_end,
            } => (entries, *more_allowed_at_end),
        };
        if !more_allowed_at_end && entries.len() != logs.len() {
            return Err(ScenarioError::ExecutionError(format!(
                "wrong number of logs. Tx {}. Want:{}. Have:{}",
                tx_id,
                entries.len(),
                logs.len()
            )));
        }
        if logs.len() < entries.len() {
            return Err(ScenarioError::ExecutionError(format!(
                "too few logs. Tx {}. Want:{}. Have:{}",
                tx_id,
                entries.len(),
                logs.len()
            )));
        }
        for (index, (expected_log, log)) in entries.iter().zip(logs).enumerate() {
            self.check_tx_log(tx_id, index, expected_log, log)?;
        }
        Ok(())
    }

    fn check_tx_log(
        &self,
        tx_id: &str,
        index: usize,
        expected: &CheckLogEntry,
        log: &LogEntry,
    ) -> Result<(), ScenarioError> {
        let mismatch = |what: &str, want: String, have: String| {
            ScenarioError::ExecutionError(format!(
                "bad log {}. Tx {}. Log index: {}. Want: {}. Have: {}",
                what, tx_id, index, want, have
            ))
        };
        if !expected.address.check(log.address.as_slice()) {
            return Err(mismatch(
                "address",
                expected.address.original_str(),
                self.reconstructor
                    .reconstruct(&log.address, ReconstructorHint::Address),
            ));
        }
        if !expected.endpoint.check(log.identifier.as_slice()) {
            return Err(mismatch(
                "identifier",
                expected.endpoint.original_str(),
                self.reconstructor
                    .reconstruct(&log.identifier, ReconstructorHint::Str),
            ));
        }
        if !expected.topics.check_list(&log.topics) {
            return Err(mismatch(
                "topics",
                format!("[{}]", expected.topics.elements_json()),
                self.reconstructor
                    .reconstruct_list(&log.topics, ReconstructorHint::NoHint),
            ));
        }
        if !expected.data.check_list(&log.data) {
            return Err(mismatch(
                "data",
                format!("[{}]", expected.data.elements_json()),
                self.reconstructor
                    .reconstruct_list(&log.data, ReconstructorHint::NoHint),
            ));
        }
        Ok(())
    }
}
