use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use kardex_catalog::{Party, PartyRole, Product, Warehouse};
use kardex_core::{ActorId, PartyId, ProductId, WarehouseId};
use kardex_engine::{InventoryStore, PurchaseService, SaleService};
use kardex_purchasing::NewPurchaseLine;
use kardex_sales::NewSaleLine;

struct BenchSetup {
    store: Arc<InventoryStore>,
    sales: SaleService,
    purchasing: PurchaseService,
    actor: ActorId,
    client: PartyId,
    supplier: PartyId,
    warehouse: WarehouseId,
    products: Vec<ProductId>,
}

fn setup(product_count: usize) -> BenchSetup {
    let store = Arc::new(InventoryStore::new());
    let actor = ActorId::new();

    let client = PartyId::new();
    let supplier = PartyId::new();
    store
        .register_party(Party::new(client, "Bench Client", PartyRole::Client, None).unwrap())
        .unwrap();
    store
        .register_party(Party::new(supplier, "Bench Supplier", PartyRole::Supplier, None).unwrap())
        .unwrap();

    let warehouse = WarehouseId::new();
    store
        .register_warehouse(Warehouse::new(warehouse, "MAIN", "Main").unwrap())
        .unwrap();

    let products: Vec<ProductId> = (0..product_count)
        .map(|i| {
            let id = ProductId::new();
            store
                .register_product(
                    Product::new(id, format!("SKU-{i}"), format!("Product {i}"), 10_00, 6_00)
                        .unwrap(),
                )
                .unwrap();
            id
        })
        .collect();

    BenchSetup {
        sales: SaleService::new(store.clone()),
        purchasing: PurchaseService::new(store.clone()),
        store,
        actor,
        client,
        supplier,
        warehouse,
        products,
    }
}

fn bench_transaction_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction_latency");
    group.sample_size(1000);

    group.bench_function("single_line_purchase", |b| {
        let env = setup(1);
        b.iter(|| {
            env.purchasing
                .create_purchase(
                    env.supplier,
                    env.warehouse,
                    env.actor,
                    vec![NewPurchaseLine {
                        product_id: env.products[0],
                        quantity: black_box(10),
                        unit_cost: 6_00,
                    }],
                    None,
                )
                .unwrap();
        });
    });

    group.bench_function("single_line_sale_with_stock", |b| {
        let env = setup(1);
        // Deep stock so the bench loop never runs dry.
        env.purchasing
            .create_purchase(
                env.supplier,
                env.warehouse,
                env.actor,
                vec![NewPurchaseLine {
                    product_id: env.products[0],
                    quantity: 100_000_000,
                    unit_cost: 6_00,
                }],
                None,
            )
            .unwrap();

        b.iter(|| {
            env.sales
                .create_sale(
                    env.client,
                    env.warehouse,
                    env.actor,
                    vec![NewSaleLine {
                        product_id: env.products[0],
                        quantity: black_box(1),
                    }],
                )
                .unwrap();
        });
    });

    group.finish();
}

fn bench_multi_line_sales(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_line_sales");

    for line_count in [1usize, 5, 20].iter() {
        group.throughput(Throughput::Elements(*line_count as u64));
        group.bench_with_input(
            BenchmarkId::new("lines", line_count),
            line_count,
            |b, &count| {
                let env = setup(count);
                env.purchasing
                    .create_purchase(
                        env.supplier,
                        env.warehouse,
                        env.actor,
                        env.products
                            .iter()
                            .map(|&product_id| NewPurchaseLine {
                                product_id,
                                quantity: 100_000_000,
                                unit_cost: 6_00,
                            })
                            .collect(),
                        None,
                    )
                    .unwrap();

                b.iter(|| {
                    env.sales
                        .create_sale(
                            env.client,
                            env.warehouse,
                            env.actor,
                            env.products
                                .iter()
                                .map(|&product_id| NewSaleLine {
                                    product_id,
                                    quantity: 1,
                                })
                                .collect(),
                        )
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_kardex_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("kardex_report");

    for movement_count in [100usize, 1_000, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("movements", movement_count),
            movement_count,
            |b, &count| {
                let env = setup(1);
                let from = chrono::Utc::now();
                env.purchasing
                    .create_purchase(
                        env.supplier,
                        env.warehouse,
                        env.actor,
                        vec![NewPurchaseLine {
                            product_id: env.products[0],
                            quantity: count as i64,
                            unit_cost: 6_00,
                        }],
                        None,
                    )
                    .unwrap();
                for _ in 0..count.saturating_sub(1) {
                    env.sales
                        .create_sale(
                            env.client,
                            env.warehouse,
                            env.actor,
                            vec![NewSaleLine {
                                product_id: env.products[0],
                                quantity: 1,
                            }],
                        )
                        .unwrap();
                }
                let to = chrono::Utc::now();

                b.iter(|| {
                    black_box(env.store.kardex(env.products[0], from, to).unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_transaction_latency,
    bench_multi_line_sales,
    bench_kardex_report
);
criterion_main!(benches);
