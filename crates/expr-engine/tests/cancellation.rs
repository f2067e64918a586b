//! Cancellation and deadlines, plus sharing compiled expressions across threads.

use expr_engine::{
    Arity, Context, Evaluable, EvalError, FunctionLibrary, Parser, Value, Vars,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_cancelled_before_eval() {
    let compiled = Parser::default().parse("1 + 1").unwrap();
    let ctx = Context::background();
    ctx.cancel();
    assert_eq!(compiled.eval(&ctx, &Vars::new()), Err(EvalError::Cancelled));
    assert_eq!(compiled.test(&ctx, &Vars::new()), Err(EvalError::Cancelled));
}

#[test]
fn test_expired_deadline() {
    let compiled = Parser::default().parse("1").unwrap();
    let ctx = Context::background().with_deadline(Instant::now() - Duration::from_millis(1));
    assert_eq!(
        compiled.eval(&ctx, &Vars::new()),
        Err(EvalError::DeadlineExceeded)
    );
}

#[test]
fn test_cancellation_observed_between_function_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    // `stop(ctx)` cancels the context it runs under; the next call must not run.
    let ext = FunctionLibrary::new("test")
        .function("tick", Arity::Fixed(0), move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Bool(true))
        })
        .function("stop", Arity::Fixed(0), |_, ctx| {
            ctx.context.cancel();
            Ok(Value::Bool(true))
        });
    let parser = Parser::with_extensions([ext]);
    let compiled = parser.parse("tick() && stop() && tick()").unwrap();

    let err = compiled
        .eval(&Context::background(), &Vars::new())
        .unwrap_err();
    assert!(err.is_cancellation());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_cancelling_a_clone_cancels_the_original() {
    let ctx = Context::background();
    let child = ctx.with_timeout(Duration::from_secs(60));
    child.cancel();
    assert!(ctx.is_cancelled());
}

#[test]
fn test_concurrent_evaluation() {
    let compiled = Arc::new(
        Parser::default()
            .parse("hasPrefix(name, 'user') && n % 2 == 0")
            .unwrap(),
    );
    let handles: Vec<_> = (0..8)
        .map(|n| {
            let compiled = Arc::clone(&compiled);
            thread::spawn(move || {
                let vars = Vars::new().with("name", format!("user{}", n)).with("n", n);
                (0..100)
                    .map(|_| compiled.test(&Context::background(), &vars).unwrap())
                    .all(|b| b == (n % 2 == 0))
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
