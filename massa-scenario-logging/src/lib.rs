// Copyright (c) 2022 MASSA LABS <info@massa.net>

/// Emits a trace event carrying a JSON payload:
/// `massa_scenario_trace!("execute_tx", {"tx_id": id})`
#[macro_export]
macro_rules! massa_scenario_trace {
    ($evt:expr, $params:tt) => {
        tracing::trace!("massa_scenario_trace:{}:{}", $evt, serde_json::json!($params));
    };
}
