use proptest::prelude::*;
use resource_exchange_core_rs::models::{Composition, Resource, ResourceBuffer, TotalInvTracker};
use resource_exchange_core_rs::policy::{BuyPolicy, BuyPolicyConfig, PolicyError};
use resource_exchange_core_rs::rng::distributions::{IntDistribution, RealDistribution};
use resource_exchange_core_rs::{ContextHandle, SimContext, Trade};

fn buy_policy(
    ctx: &ContextHandle,
    capacity: f64,
    config: BuyPolicyConfig,
) -> (BuyPolicy, resource_exchange_core_rs::models::buffer::BufferHandle) {
    let buf = ResourceBuffer::handle(capacity);
    let mut p = BuyPolicy::init(ctx.clone(), "reactor-1", buf.clone(), "fuel_buy", None, config)
        .unwrap();
    p.set_commodity("uox");
    (p, buf)
}

#[test]
fn test_empty_buffer_requests_full_capacity() {
    let ctx = SimContext::handle(1);
    let (mut p, _buf) = buy_policy(&ctx, 40.0, BuyPolicyConfig::default());

    let ports = p.material_requests();
    assert_eq!(ports.len(), 1);
    assert_eq!(ports[0].requests()[0].resource.quantity(), 40.0);
    assert_eq!(ports[0].requests()[0].commodity, "uox");
}

#[test]
fn test_quantized_shortfall_partition() {
    let ctx = SimContext::handle(1);
    let config = BuyPolicyConfig {
        quantize: 15.0,
        ..Default::default()
    };
    let (mut p, _buf) = buy_policy(&ctx, 40.0, config);

    let amounts: Vec<f64> = p
        .material_requests()
        .iter()
        .map(|port| port.requests()[0].resource.quantity())
        .collect();
    assert_eq!(amounts, vec![15.0, 15.0, 10.0]);
}

#[test]
fn test_throughput_bounds_each_step() {
    let ctx = SimContext::handle(1);
    let config = BuyPolicyConfig {
        throughput: 50.0,
        ..Default::default()
    };
    let (mut p, buf) = buy_policy(&ctx, 200.0, config);

    let ports = p.material_requests();
    let asked = ports[0].requests()[0].resource.quantity();
    assert_eq!(asked, 50.0);

    // deliver and ask again: the next round is throughput-bound too
    let trade = Trade {
        request: ports[0].requests()[0].clone(),
        amt: asked,
    };
    p.accept_trades(&[(trade, Resource::new(asked, Composition::trace()))])
        .unwrap();
    assert_eq!(buf.borrow().quantity(), 50.0);

    ctx.borrow_mut().advance_time();
    let ports = p.material_requests();
    assert_eq!(ports[0].requests()[0].resource.quantity(), 50.0);
}

#[test]
fn test_settlement_conserves_inventory() {
    let ctx = SimContext::handle(1);
    let (mut p, buf) = buy_policy(&ctx, 100.0, BuyPolicyConfig::default());

    let ports = p.material_requests();
    let request = ports[0].requests()[0].clone();
    let responses = vec![
        (
            Trade {
                request: request.clone(),
                amt: 60.0,
            },
            Resource::new(60.0, Composition::trace()),
        ),
        (
            Trade {
                request,
                amt: 25.0,
            },
            Resource::new(25.0, Composition::trace()),
        ),
    ];
    p.accept_trades(&responses).unwrap();
    assert!((buf.borrow().quantity() - 85.0).abs() < 1e-9);
}

#[test]
fn test_dormant_window_suppresses_requests() {
    let ctx = SimContext::handle(1);
    let config = BuyPolicyConfig {
        active: IntDistribution::fixed(2),
        dormant: IntDistribution::fixed(3),
        ..Default::default()
    };
    let (mut p, _buf) = buy_policy(&ctx, 100.0, config);

    let mut active_steps = Vec::new();
    for t in 0..10 {
        if !p.material_requests().is_empty() {
            active_steps.push(t);
        }
        ctx.borrow_mut().advance_time();
    }
    // active 0..2, dormant 2..5, active 5..7, dormant 7..10
    assert_eq!(active_steps, vec![0, 1, 5, 6]);
}

#[test]
fn test_request_size_fraction_scales_amount() {
    let ctx = SimContext::handle(1);
    let config = BuyPolicyConfig {
        request_size: RealDistribution::fixed(0.5),
        ..Default::default()
    };
    let (mut p, _buf) = buy_policy(&ctx, 80.0, config);

    let ports = p.material_requests();
    assert_eq!(ports[0].requests()[0].resource.quantity(), 40.0);
}

#[test]
fn test_cumulative_cap_cycle() {
    let ctx = SimContext::handle(1);
    let config = BuyPolicyConfig {
        cumulative_cap: Some(30.0),
        dormant: IntDistribution::fixed(2),
        ..Default::default()
    };
    let (mut p, buf) = buy_policy(&ctx, 100.0, config);

    // step 0: the request is clipped to the cap
    let ports = p.material_requests();
    let request = ports[0].requests()[0].clone();
    assert_eq!(request.resource.quantity(), 30.0);

    p.accept_trades(&[(
        Trade {
            request,
            amt: 30.0,
        },
        Resource::new(30.0, Composition::trace()),
    )])
    .unwrap();

    // steps 1 and 2 are dormant, step 3 requests again
    for expected_empty in [true, true] {
        ctx.borrow_mut().advance_time();
        assert_eq!(p.material_requests().is_empty(), expected_empty);
    }
    ctx.borrow_mut().advance_time();
    let ports = p.material_requests();
    assert!(!ports.is_empty());
    // intake accounting was reset, so the full cap is available again
    assert_eq!(ports[0].requests()[0].resource.quantity(), 30.0);
    assert_eq!(buf.borrow().quantity(), 30.0);
}

#[test]
fn test_shared_tracker_limits_requests() {
    let ctx = SimContext::handle(1);
    let fresh = ResourceBuffer::handle(60.0);
    let spent = ResourceBuffer::handle(60.0);
    spent
        .borrow_mut()
        .push(Resource::new(50.0, Composition::trace()))
        .unwrap();
    let tracker = TotalInvTracker::init(vec![fresh.clone(), spent], 80.0).unwrap();

    let mut p = BuyPolicy::init(
        ctx,
        "reactor-1",
        fresh,
        "fuel_buy",
        Some(tracker),
        BuyPolicyConfig::default(),
    )
    .unwrap();
    p.set_commodity("uox");

    // fill_to clamps to the policy buffer's own 60 kg capacity, so with
    // 50 kg already in the sibling buffer the request tops out at
    // 60 - 50 = 10 kg; the shared cap's remaining 30 kg is the looser
    // bound here and never raises the fill target
    let ports = p.material_requests();
    assert_eq!(ports[0].requests()[0].resource.quantity(), 10.0);
}

#[test]
fn test_unregistered_after_scope_ends() {
    let ctx = SimContext::handle(1);
    {
        let (mut p, _buf) = buy_policy(&ctx, 10.0, BuyPolicyConfig::default());
        p.start();
        assert_eq!(ctx.borrow().trader_count(), 1);
    }
    assert_eq!(ctx.borrow().trader_count(), 0);
}

#[test]
fn test_fill_to_zero_is_recoverable() {
    let ctx = SimContext::handle(1);
    let buf = ResourceBuffer::handle(10.0);
    let err = BuyPolicy::init(
        ctx,
        "reactor-1",
        buf,
        "fuel_buy",
        None,
        BuyPolicyConfig {
            fill_to: -3.0,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        PolicyError::NonPositive {
            field: "fill_to",
            value: -3.0
        }
    );
}

proptest! {
    // ceil(amt / quantize) chunks, all full except a truncated last one,
    // always summing back to the shortfall
    #[test]
    fn prop_quantized_requests_partition_shortfall(
        capacity in 1.0f64..500.0,
        quantize in 0.5f64..50.0,
    ) {
        let ctx = SimContext::handle(1);
        let buf = ResourceBuffer::handle(capacity);
        let mut p = BuyPolicy::init(
            ctx,
            "reactor-1",
            buf,
            "fuel_buy",
            None,
            BuyPolicyConfig { quantize, ..Default::default() },
        )
        .unwrap();
        p.set_commodity("uox");

        let amounts: Vec<f64> = p
            .material_requests()
            .iter()
            .map(|port| port.requests()[0].resource.quantity())
            .collect();

        prop_assert_eq!(amounts.len(), (capacity / quantize).ceil() as usize);
        let total: f64 = amounts.iter().sum();
        prop_assert!((total - capacity).abs() < 1e-6);
        for amt in &amounts[..amounts.len() - 1] {
            prop_assert!((amt - quantize).abs() < 1e-9);
        }
        prop_assert!(amounts[amounts.len() - 1] <= quantize + 1e-9);
    }
}
