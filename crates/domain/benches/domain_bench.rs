use common::UserId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    CartLineItem, CartLineUpdate, DeliveryOption, Money, NewOrder, OrderItem, OrderStatus,
    PaymentMethod,
};

fn bench_merge_add(c: &mut Criterion) {
    let user_id = UserId::new();

    c.bench_function("domain/merge_add_100", |b| {
        b.iter(|| {
            let mut line =
                CartLineItem::new(user_id, "bench-product", 1, DeliveryOption::Free).unwrap();
            for _ in 0..100 {
                line.merge_add(1, None).unwrap();
            }
            line.quantity
        });
    });
}

fn bench_apply_update(c: &mut Criterion) {
    let user_id = UserId::new();
    let update = CartLineUpdate::new()
        .with_quantity(5)
        .with_delivery_option(DeliveryOption::Fast);

    c.bench_function("domain/apply_update", |b| {
        b.iter(|| {
            let mut line =
                CartLineItem::new(user_id, "bench-product", 1, DeliveryOption::Free).unwrap();
            line.apply_update(&update).unwrap();
            line.quantity
        });
    });
}

fn bench_build_order_50_items(c: &mut Criterion) {
    let user_id = UserId::new();
    let items: Vec<OrderItem> = (0..50)
        .map(|i| {
            OrderItem::new(
                format!("product-{i:03}"),
                format!("Product {i}"),
                1 + (i % 3),
                DeliveryOption::Free,
                Money::from_cents(100 * (i as i64 + 1)),
            )
        })
        .collect();

    c.bench_function("domain/build_order_50_items", |b| {
        b.iter(|| {
            NewOrder::from_items(
                user_id,
                "1 Bench Street",
                PaymentMethod::CreditCard,
                items.clone(),
            )
            .unwrap()
            .total_amount()
        });
    });
}

fn bench_money_display(c: &mut Criterion) {
    c.bench_function("domain/money_display_string", |b| {
        b.iter(|| Money::from_cents(123_456_789).display_string().unwrap());
    });
}

fn bench_status_walk(c: &mut Criterion) {
    let items = vec![OrderItem::new(
        "bench-product",
        "Product",
        2,
        DeliveryOption::Fast,
        Money::from_cents(2000),
    )];

    c.bench_function("domain/status_walk_to_delivered", |b| {
        b.iter(|| {
            let mut order = NewOrder::from_items(
                UserId::new(),
                "1 Bench Street",
                PaymentMethod::CreditCard,
                items.clone(),
            )
            .unwrap()
            .into_order(common::OrderId::from_i64(1));

            order.transition(OrderStatus::Confirmed).unwrap();
            order.transition(OrderStatus::Shipped).unwrap();
            order.transition(OrderStatus::Delivered).unwrap();
            order.status()
        });
    });
}

criterion_group!(
    benches,
    bench_merge_add,
    bench_apply_update,
    bench_build_order_50_items,
    bench_money_display,
    bench_status_walk,
);
criterion_main!(benches);
