#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<(String, i32)>, Vec<String>, String)| {
    let mut matcher = sprig::Node::new();

    for (key, item) in data.0 {
        if matcher.insert(key, item).is_err() {
            return;
        }
    }

    let mut router = sprig::Router::new();
    for prefix in data.1 {
        if router
            .add_middleware(&prefix, [|ctx: &mut sprig::Context| ctx.next()])
            .is_err()
        {
            return;
        }
    }

    let _ = matcher.at(&data.2);
    let _ = matcher.trace(&data.2).count();
    let _ = router.resolve(&http::Method::GET, &data.2);
});
