use super::*;

#[test]
fn shallow_recursion() {
    fn depth_sum(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { n + depth_sum(n - 1) })
    }

    assert_eq!(depth_sum(100), 5050);
}

#[test]
fn deep_recursion_with_large_frames() {
    // Each level keeps a 1KB buffer alive, like an argument vector would.
    fn nest(n: u32) -> u32 {
        ensure_sufficient_stack(|| {
            let buf = [n as u8; 1024];
            if n == 0 {
                u32::from(buf[0])
            } else {
                nest(n - 1) + u32::from(buf[1023] == n as u8)
            }
        })
    }

    assert_eq!(nest(50_000), 50_000);
}

#[test]
fn passes_results_through() {
    let result: Result<i32, &str> = ensure_sufficient_stack(|| Err("boom"));
    assert_eq!(result, Err("boom"));
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn reports_remaining_stack_on_native() {
    assert!(remaining_stack().is_some());
}
