use super::*;

use crate::mask::scripted::{ScriptedRuntime, coarse_model};

fn handle() -> ModelHandle {
    ModelHandle::new(ModelAsset::new("m", "m.onnx"), 4)
}

#[test]
fn nothing_loads_until_first_acquire() {
    let rt = ScriptedRuntime::new().model("m", coarse_model(2, 2));
    let h = handle();
    assert_eq!(h.status(), HandleStatus::Uninitialized);
    assert!(rt.loads().is_empty());
}

#[test]
fn accelerated_backend_is_preferred() {
    let rt = ScriptedRuntime::new()
        .with_accelerator()
        .model("m", coarse_model(2, 2));
    let mut h = handle();
    assert!(h.acquire(&rt).is_ok());
    assert_eq!(h.status(), HandleStatus::Ready(ExecutionBackend::Accelerated));
    assert_eq!(rt.loads().len(), 1);

    // Ready handles are reused without touching the runtime again.
    assert!(h.acquire(&rt).is_ok());
    assert_eq!(rt.loads().len(), 1);
}

#[test]
fn missing_accelerator_downgrades_to_cpu() {
    let rt = ScriptedRuntime::new().model("m", coarse_model(2, 2));
    let mut h = handle();
    let session = h.acquire(&rt).unwrap();
    assert_eq!(session.inputs().len(), 1);
    assert_eq!(
        h.status(),
        HandleStatus::Ready(ExecutionBackend::Cpu { threads: 4 })
    );
    assert_eq!(
        rt.loads(),
        vec![
            ("m".to_owned(), ExecutionBackend::Accelerated),
            ("m".to_owned(), ExecutionBackend::Cpu { threads: 4 }),
        ]
    );
}

#[test]
fn one_failure_is_retried_on_next_acquire() {
    let rt = ScriptedRuntime::new()
        .model("m", coarse_model(2, 2))
        .failing_loads("m", 1);
    let mut h = handle();

    assert!(h.acquire(&rt).is_err());
    assert_eq!(h.status(), HandleStatus::RetryPending);

    assert!(h.acquire(&rt).is_ok());
    assert_eq!(
        h.status(),
        HandleStatus::Ready(ExecutionBackend::Cpu { threads: 4 })
    );
}

#[test]
fn second_failure_is_permanent() {
    let rt = ScriptedRuntime::new()
        .model("m", coarse_model(2, 2))
        .failing_loads("m", 5);
    let mut h = handle();

    assert!(h.acquire(&rt).is_err());
    let err = h.acquire(&rt).err().unwrap();
    assert!(matches!(err, FramepopError::AssetLoad(_)));
    assert_eq!(h.status(), HandleStatus::Failed);
    let loads = rt.loads().len();
    assert_eq!(loads, 4);

    let err = h.acquire(&rt).err().unwrap();
    assert!(err.to_string().contains("permanently unavailable"));
    assert_eq!(rt.loads().len(), loads);
}
