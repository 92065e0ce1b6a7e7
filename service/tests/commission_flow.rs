use std::time::Duration;

use common::{pagination::Arguments, Money};
use service::{
    command::{
        self,
        mark_commission_installment_paid::ExecutionError as MarkCommissionError,
        mark_down_payment_installment_paid::ExecutionError as MarkDownPaymentError,
        CreateBroker, CreateDevelopment, CreateSale, DeleteBroker,
        DeleteDevelopment, DeleteSale, MarkCommissionInstallmentPaid,
        MarkDownPaymentInstallmentPaid, UpdateBroker, UpdateDevelopment,
    },
    domain::{
        broker, development,
        sale::{self, schedule::InvalidInput, Status},
        Broker, Development, Sale,
    },
    infra::Memory,
    query::{self, report},
    read, Command as _, Config, Service,
};

fn money(s: &str) -> Money {
    s.parse().unwrap()
}

fn service() -> Service<Memory> {
    Service::new(Config::default(), Memory::new())
}

async fn broker(service: &Service<Memory>, name: &str) -> Broker {
    service
        .execute(CreateBroker {
            name: broker::Name::new(name).unwrap(),
            email: broker::Email::new(format!(
                "{}@example.com",
                name.to_lowercase(),
            ))
            .unwrap(),
            phone: None,
            hired_on: "2023-06-01".parse().unwrap(),
        })
        .await
        .unwrap()
}

async fn development(
    service: &Service<Memory>,
    name: &str,
    commission: &str,
) -> Development {
    service
        .execute(CreateDevelopment {
            name: development::Name::new(name).unwrap(),
            location: development::Location::new("Campinas").unwrap(),
            commission: money(commission),
        })
        .await
        .unwrap()
}

fn new_sale(
    broker: &Broker,
    development: &Development,
    down_payment: &str,
    installments_count: i32,
    sold_on: &str,
) -> CreateSale {
    CreateSale {
        client_name: sale::ClientName::new("Maria Silva").unwrap(),
        development_id: development.id,
        broker_id: broker.id,
        down_payment: money(down_payment),
        installments_count,
        sold_on: sold_on.parse().unwrap(),
        lot: sale::Lot::new("12"),
        block: sale::Block::new("B"),
    }
}

async fn sales_count(service: &Service<Memory>) -> i32 {
    i32::from(
        service
            .execute(query::sales::TotalCount::by(
                read::sale::list::Filter::default(),
            ))
            .await
            .unwrap(),
    )
}

async fn reload(service: &Service<Memory>, id: sale::Id) -> Sale {
    service
        .execute(query::sale::ById::by(id))
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn creates_sale_with_linked_installments() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "800").await;

    let sale = service
        .execute(new_sale(&john, &aurora, "60000", 3, "2024-01-31"))
        .await
        .unwrap();

    assert_eq!(sale.commission, money("800"));
    assert_eq!(sale.installments_count.get(), 3);
    assert_eq!(sale.down_payment_installments.len(), 3);
    assert_eq!(sale.commission_installments.len(), 3);
    assert_eq!(
        sale.down_payment_installments
            .iter()
            .map(|i| i.due_on.to_string())
            .collect::<Vec<_>>(),
        ["2024-01-31", "2024-02-29", "2024-03-31"],
    );
    for (dp, c) in sale
        .down_payment_installments
        .iter()
        .zip(&sale.commission_installments)
    {
        assert_eq!(c.down_payment_installment_id, dp.id);
        assert_eq!(c.number, dp.number);
        assert_eq!(c.due_on, None);
    }
    assert_eq!(sale.status(service.today()), Status::Awaiting);
    assert_eq!(sale.commission_paid(), Money::ZERO);
    assert_eq!(sale.commission_pending(), Money::ZERO);

    let stored = reload(&service, sale.id).await;
    assert_eq!(stored.commission_installments.len(), 3);
}

#[tokio::test]
async fn rejects_sale_of_unknown_parties() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "800").await;

    let mut cmd = new_sale(&john, &aurora, "60000", 3, "2024-01-25");
    cmd.broker_id = broker::Id::new();
    let err = service.execute(cmd).await.unwrap_err().into_inner();
    assert!(matches!(
        err,
        command::create_sale::ExecutionError::BrokerNotExists(_),
    ));

    let mut cmd = new_sale(&john, &aurora, "60000", 3, "2024-01-25");
    cmd.development_id = development::Id::new();
    let err = service.execute(cmd).await.unwrap_err().into_inner();
    assert!(matches!(
        err,
        command::create_sale::ExecutionError::DevelopmentNotExists(_),
    ));

    let err = service
        .execute(new_sale(&john, &aurora, "60000", 0, "2024-01-25"))
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::create_sale::ExecutionError::InvalidInput(_),
    ));
}

#[tokio::test]
async fn paying_down_payment_makes_commission_due() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "900").await;
    let sale = service
        .execute(new_sale(&john, &aurora, "30000", 3, "2024-01-25"))
        .await
        .unwrap();
    let dp = sale.down_payment_installments[1].id;

    let sale = service
        .execute(MarkDownPaymentInstallmentPaid {
            installment_id: dp,
            paid_on: Some("2024-02-25".parse().unwrap()),
        })
        .await
        .unwrap();

    let linked = sale.linked_commission_installment(dp).unwrap();
    assert_eq!(linked.due_on.unwrap().to_string(), "2024-03-03");
    assert!(!linked.is_paid());
    assert_eq!(
        sale.commission_installments
            .iter()
            .filter(|i| i.due_on.is_some())
            .count(),
        1,
    );
    assert_eq!(sale.commission_pending(), money("300"));
    assert_eq!(sale.status(service.today()), Status::Overdue);

    let stored = reload(&service, sale.id).await;
    assert_eq!(
        stored.down_payment_installment(dp).unwrap().paid_on,
        Some("2024-02-25".parse().unwrap()),
    );
}

#[tokio::test]
async fn repaying_installment_changes_nothing() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "900").await;
    let sale = service
        .execute(new_sale(&john, &aurora, "30000", 3, "2024-01-25"))
        .await
        .unwrap();
    let dp = sale.down_payment_installments[0].id;

    for paid_on in ["2024-01-25", "2024-02-10"] {
        drop(
            service
                .execute(MarkDownPaymentInstallmentPaid {
                    installment_id: dp,
                    paid_on: Some(paid_on.parse().unwrap()),
                })
                .await
                .unwrap(),
        );
    }

    let stored = reload(&service, sale.id).await;
    assert_eq!(
        stored.down_payment_installment(dp).unwrap().paid_on,
        Some("2024-01-25".parse().unwrap()),
    );
    assert_eq!(
        stored
            .linked_commission_installment(dp)
            .unwrap()
            .due_on
            .unwrap()
            .to_string(),
        "2024-02-01",
    );
}

#[tokio::test]
async fn pays_commission_only_once_due() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "900").await;
    let sale = service
        .execute(new_sale(&john, &aurora, "30000", 3, "2024-01-25"))
        .await
        .unwrap();
    let dp = sale.down_payment_installments[0].id;
    let c = sale.commission_installments[0].id;

    let err = service
        .execute(MarkCommissionInstallmentPaid {
            installment_id: c,
            paid_on: None,
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        MarkCommissionError::NotDue(id) if id == c,
    ));

    drop(
        service
            .execute(MarkDownPaymentInstallmentPaid {
                installment_id: dp,
                paid_on: None,
            })
            .await
            .unwrap(),
    );
    let sale = service
        .execute(MarkCommissionInstallmentPaid {
            installment_id: c,
            paid_on: None,
        })
        .await
        .unwrap();

    let paid = sale.commission_installment(c).unwrap();
    assert!(paid.is_paid());
    assert_eq!(paid.paid_on.map(|d| d.coerce()), Some(service.today()));
    assert_eq!(sale.commission_paid(), money("300"));
    assert_eq!(sale.commission_pending(), Money::ZERO);
    assert_eq!(sale.status(service.today()), Status::Awaiting);
}

#[tokio::test]
async fn fails_on_unknown_installments() {
    let service = service();

    let err = service
        .execute(MarkDownPaymentInstallmentPaid {
            installment_id: sale::down_payment::Id::new(),
            paid_on: None,
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        MarkDownPaymentError::InstallmentNotExists(_),
    ));

    let err = service
        .execute(MarkCommissionInstallmentPaid {
            installment_id: sale::commission::Id::new(),
            paid_on: None,
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        MarkCommissionError::InstallmentNotExists(_),
    ));
}

#[tokio::test]
async fn keeps_commission_of_existing_sales() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "800").await;
    let before = service
        .execute(new_sale(&john, &aurora, "60000", 2, "2024-01-25"))
        .await
        .unwrap();

    let updated = service
        .execute(UpdateDevelopment {
            development_id: aurora.id,
            name: None,
            location: None,
            commission: Some(money("1000")),
        })
        .await
        .unwrap();
    assert_eq!(updated.commission, money("1000"));
    assert_eq!(updated.name, aurora.name);

    let after = service
        .execute(new_sale(&john, &aurora, "60000", 2, "2024-01-26"))
        .await
        .unwrap();

    assert_eq!(reload(&service, before.id).await.commission, money("800"));
    assert_eq!(after.commission, money("1000"));
}

#[tokio::test]
async fn deletes_sale_with_installments() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "800").await;
    let sale = service
        .execute(new_sale(&john, &aurora, "60000", 2, "2024-01-25"))
        .await
        .unwrap();

    service
        .execute(DeleteSale { sale_id: sale.id })
        .await
        .unwrap();

    assert!(service
        .execute(query::sale::ById::by(sale.id))
        .await
        .unwrap()
        .is_none());
    let err = service
        .execute(MarkDownPaymentInstallmentPaid {
            installment_id: sale.down_payment_installments[0].id,
            paid_on: None,
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        MarkDownPaymentError::InstallmentNotExists(_),
    ));

    let err = service
        .execute(DeleteSale { sale_id: sale.id })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::delete_sale::ExecutionError::SaleNotExists(_),
    ));
}

#[tokio::test]
async fn lists_sales_newest_first() {
    let service = service();
    let john = broker(&service, "John").await;
    let anna = broker(&service, "Anna").await;
    let aurora = development(&service, "Aurora", "800").await;

    let mut created = vec![];
    for (b, sold_on) in [
        (&john, "2024-01-10"),
        (&anna, "2024-01-20"),
        (&john, "2024-02-05"),
    ] {
        // `created_at` has a microsecond precision.
        tokio::time::sleep(Duration::from_millis(2)).await;
        created.push(
            service
                .execute(new_sale(b, &aurora, "1000", 2, sold_on))
                .await
                .unwrap()
                .id,
        );
    }

    let first = service
        .execute(query::sales::List::by(read::sale::list::Selector {
            arguments: Arguments::new(Some(2), None, None, None, 10).unwrap(),
            filter: read::sale::list::Filter::default(),
        }))
        .await
        .unwrap();
    assert_eq!(
        first.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
        [created[2], created[1]],
    );
    assert!(first.page_info().has_next_page);

    let rest = service
        .execute(query::sales::List::by(read::sale::list::Selector {
            arguments: Arguments::new(
                Some(2),
                first.page_info().end_cursor,
                None,
                None,
                10,
            )
            .unwrap(),
            filter: read::sale::list::Filter::default(),
        }))
        .await
        .unwrap();
    assert_eq!(
        rest.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
        [created[0]],
    );
    assert!(!rest.page_info().has_next_page);

    let filter = read::sale::list::Filter {
        broker_id: Some(john.id),
        month: Some("2024-01".parse().unwrap()),
        ..read::sale::list::Filter::default()
    };
    let filtered = service
        .execute(query::sales::List::by(read::sale::list::Selector {
            arguments: Arguments::new(None, None, None, None, 10).unwrap(),
            filter,
        }))
        .await
        .unwrap();
    assert_eq!(
        filtered.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
        [created[0]],
    );
    let total = service
        .execute(query::sales::TotalCount::by(filter))
        .await
        .unwrap();
    assert_eq!(i32::from(total), 1);
}

#[tokio::test]
async fn filters_sales_by_status() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "800").await;
    let awaiting = service
        .execute(new_sale(&john, &aurora, "1000", 2, "2024-01-10"))
        .await
        .unwrap();
    let overdue = service
        .execute(new_sale(&john, &aurora, "1000", 2, "2024-01-10"))
        .await
        .unwrap();
    let pending = service
        .execute(new_sale(&john, &aurora, "1000", 2, "2024-01-10"))
        .await
        .unwrap();
    let paid = service
        .execute(new_sale(&john, &aurora, "1000", 1, "2024-01-10"))
        .await
        .unwrap();
    for (installment_id, paid_on) in [
        (overdue.down_payment_installments[0].id, Some("2024-01-10")),
        (pending.down_payment_installments[0].id, None),
        (paid.down_payment_installments[0].id, None),
    ] {
        drop(
            service
                .execute(MarkDownPaymentInstallmentPaid {
                    installment_id,
                    paid_on: paid_on.map(|d| d.parse().unwrap()),
                })
                .await
                .unwrap(),
        );
    }
    drop(
        service
            .execute(MarkCommissionInstallmentPaid {
                installment_id: paid.commission_installments[0].id,
                paid_on: None,
            })
            .await
            .unwrap(),
    );

    for (status, expected) in [
        (Status::Awaiting, awaiting.id),
        (Status::Overdue, overdue.id),
        (Status::Pending, pending.id),
        (Status::Paid, paid.id),
    ] {
        let page = service
            .execute(query::sales::List::by(read::sale::list::Selector {
                arguments: Arguments::new(None, None, None, None, 10)
                    .unwrap(),
                filter: read::sale::list::Filter {
                    status: Some(read::sale::list::StatusAsOf {
                        status,
                        today: service.today(),
                    }),
                    ..read::sale::list::Filter::default()
                },
            }))
            .await
            .unwrap();
        assert_eq!(
            page.edges.iter().map(|e| e.node).collect::<Vec<_>>(),
            [expected],
        );
    }
}

#[tokio::test]
async fn reports_commissions() {
    let service = service();
    let john = broker(&service, "John").await;
    let anna = broker(&service, "Anna").await;
    let idle = broker(&service, "Idle").await;
    let aurora = development(&service, "Aurora", "900").await;
    let bosque = development(&service, "Bosque", "600").await;

    let first = service
        .execute(new_sale(&john, &aurora, "30000", 3, "2024-01-10"))
        .await
        .unwrap();
    drop(
        service
            .execute(new_sale(&anna, &bosque, "20000", 2, "2024-01-15"))
            .await
            .unwrap(),
    );
    drop(
        service
            .execute(new_sale(&anna, &aurora, "10000", 1, "2023-12-20"))
            .await
            .unwrap(),
    );

    for (i, paid_on) in [(0, "2024-01-10"), (1, "2024-02-10")] {
        let dp = first.down_payment_installments[i].id;
        drop(
            service
                .execute(MarkDownPaymentInstallmentPaid {
                    installment_id: dp,
                    paid_on: Some(paid_on.parse().unwrap()),
                })
                .await
                .unwrap(),
        );
    }
    drop(
        service
            .execute(MarkCommissionInstallmentPaid {
                installment_id: first.commission_installments[0].id,
                paid_on: Some("2024-01-20".parse().unwrap()),
            })
            .await
            .unwrap(),
    );

    let report = service
        .execute(report::Commissions {
            period: read::sale::Period::month("2024-01".parse().unwrap()),
        })
        .await
        .unwrap();

    assert_eq!(report.sales_count, 2);
    assert_eq!(report.generated, money("1500"));
    assert_eq!(report.paid, money("300"));
    assert_eq!(report.pending, money("300"));
    assert_eq!(report.overdue_count, 1);
    assert_eq!(report.brokers_count, 3);

    assert_eq!(
        report.brokers.iter().map(|r| r.broker_id).collect::<Vec<_>>(),
        [john.id, anna.id, idle.id],
    );
    assert_eq!(report.brokers[0].total(), money("600"));
    assert_eq!(report.brokers[1].sales_count, 1);
    assert_eq!(report.brokers[2].sales_count, 0);

    let aurora_row = report
        .developments
        .iter()
        .find(|r| r.development_id == aurora.id)
        .unwrap();
    assert_eq!(aurora_row.sales_count, 1);
    assert_eq!(aurora_row.revenue, money("30000"));
    assert_eq!(aurora_row.commission, money("900"));
    assert!(report
        .developments
        .iter()
        .any(|r| r.development_id == bosque.id && r.sales_count == 1));
}

#[tokio::test]
async fn builds_broker_dashboard() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "900").await;
    let sale = service
        .execute(new_sale(&john, &aurora, "30000", 3, "2024-01-10"))
        .await
        .unwrap();

    drop(
        service
            .execute(MarkDownPaymentInstallmentPaid {
                installment_id: sale.down_payment_installments[0].id,
                paid_on: Some("2024-01-10".parse().unwrap()),
            })
            .await
            .unwrap(),
    );
    drop(
        service
            .execute(MarkDownPaymentInstallmentPaid {
                installment_id: sale.down_payment_installments[1].id,
                paid_on: None,
            })
            .await
            .unwrap(),
    );

    let dashboard = service
        .execute(report::BrokerDashboard { broker_id: john.id })
        .await
        .unwrap();

    assert_eq!(dashboard.sales_count, 1);
    assert_eq!(dashboard.paid, Money::ZERO);
    assert_eq!(dashboard.pending, money("600"));
    assert_eq!(
        dashboard
            .overdue
            .iter()
            .map(|e| e.installment.id)
            .collect::<Vec<_>>(),
        [sale.commission_installments[0].id],
    );
    assert_eq!(
        dashboard
            .upcoming
            .iter()
            .map(|e| e.installment.id)
            .collect::<Vec<_>>(),
        [sale.commission_installments[1].id],
    );
    assert!(dashboard.upcoming.iter().all(|e| e.sale_id == sale.id));
    assert_eq!(dashboard.developments.len(), 1);
    assert_eq!(dashboard.developments[0].development_id, aurora.id);

    let err = service
        .execute(report::BrokerDashboard {
            broker_id: broker::Id::new(),
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        report::broker_dashboard::ExecutionError::BrokerNotExists(_),
    ));
}

#[tokio::test]
async fn rejects_amounts_beyond_storage() {
    let service = service();
    let john = broker(&service, "John").await;
    let huge = money("50000000000000000000000000000");

    let err = service
        .execute(CreateDevelopment {
            name: development::Name::new("Aurora").unwrap(),
            location: development::Location::new("Campinas").unwrap(),
            commission: huge,
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::create_development::ExecutionError::CommissionOutOfRange(m)
            if m == huge,
    ));

    let aurora = development(&service, "Aurora", "99999999999999.99").await;
    let mut cmd = new_sale(&john, &aurora, "1000", 2, "2024-01-10");
    cmd.down_payment = huge;
    let err = service.execute(cmd).await.unwrap_err().into_inner();
    assert!(matches!(
        err,
        command::create_sale::ExecutionError::InvalidInput(
            InvalidInput::AmountOutOfRange(_),
        ),
    ));

    for _ in 0..2 {
        drop(
            service
                .execute(new_sale(
                    &john,
                    &aurora,
                    "99999999999999.99",
                    1,
                    "2024-01-10",
                ))
                .await
                .unwrap(),
        );
    }
    let report = service
        .execute(report::Commissions {
            period: read::sale::Period::month("2024-01".parse().unwrap()),
        })
        .await
        .unwrap();
    assert_eq!(report.sales_count, 2);
    assert_eq!(report.generated, money("199999999999999.98"));
}

#[tokio::test]
async fn failed_commands_leave_store_untouched() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "800").await;

    let mut unknown = new_sale(&john, &aurora, "1000", 2, "2024-01-10");
    unknown.broker_id = broker::Id::new();
    for cmd in [
        new_sale(&john, &aurora, "1000", 0, "2024-01-10"),
        new_sale(&john, &aurora, "-1000", 2, "2024-01-10"),
        unknown,
    ] {
        assert!(service.execute(cmd).await.is_err());
    }
    assert_eq!(sales_count(&service).await, 0);

    let err = service
        .execute(UpdateDevelopment {
            development_id: aurora.id,
            name: Some(development::Name::new("Bosque").unwrap()),
            location: None,
            commission: Some(money("-1")),
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::update_development::ExecutionError::NegativeCommission(_),
    ));
    let stored = service
        .execute(query::development::ById::by(aurora.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, aurora.name);
    assert_eq!(stored.commission, money("800"));

    let sale = service
        .execute(new_sale(&john, &aurora, "1000", 2, "2024-01-10"))
        .await
        .unwrap();
    assert!(service
        .execute(DeleteBroker { broker_id: john.id })
        .await
        .is_err());
    assert!(service
        .execute(query::broker::ById::by(john.id))
        .await
        .unwrap()
        .is_some());
    assert_eq!(reload(&service, sale.id).await.broker_id, john.id);
    assert_eq!(sales_count(&service).await, 1);
}

#[tokio::test]
async fn updates_broker() {
    let service = service();
    let cmd = CreateBroker {
        name: broker::Name::new("John").unwrap(),
        email: broker::Email::new("john@example.com").unwrap(),
        phone: broker::Phone::new("(11) 98765-4321"),
        hired_on: "2023-06-01".parse().unwrap(),
    };
    assert!(cmd.phone.is_some());
    let john = service.execute(cmd).await.unwrap();

    let updated = service
        .execute(UpdateBroker {
            broker_id: john.id,
            name: Some(broker::Name::new("John Doe").unwrap()),
            email: None,
            phone: Some(None),
            hired_on: None,
        })
        .await
        .unwrap();
    assert_eq!(updated.name, broker::Name::new("John Doe").unwrap());
    assert_eq!(updated.email, john.email);
    assert_eq!(updated.phone, None);
    assert_eq!(updated.hired_on, john.hired_on);

    let stored = service
        .execute(query::broker::ById::by(john.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, updated.name);
    assert_eq!(stored.phone, None);

    let err = service
        .execute(UpdateBroker {
            broker_id: broker::Id::new(),
            name: None,
            email: None,
            phone: None,
            hired_on: None,
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::update_broker::ExecutionError::BrokerNotExists(_),
    ));
}

#[tokio::test]
async fn deletes_only_parties_without_sales() {
    let service = service();
    let john = broker(&service, "John").await;
    let aurora = development(&service, "Aurora", "800").await;
    let sale = service
        .execute(new_sale(&john, &aurora, "1000", 2, "2024-01-10"))
        .await
        .unwrap();

    let err = service
        .execute(DeleteBroker { broker_id: john.id })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::delete_broker::ExecutionError::BrokerHasSales(id)
            if id == john.id,
    ));
    let err = service
        .execute(DeleteDevelopment {
            development_id: aurora.id,
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::delete_development::ExecutionError::DevelopmentHasSales(id)
            if id == aurora.id,
    ));

    service
        .execute(DeleteSale { sale_id: sale.id })
        .await
        .unwrap();

    let deleted = service
        .execute(DeleteBroker { broker_id: john.id })
        .await
        .unwrap();
    assert_eq!(deleted.id, john.id);
    assert!(service
        .execute(query::broker::ById::by(john.id))
        .await
        .unwrap()
        .is_none());

    let deleted = service
        .execute(DeleteDevelopment {
            development_id: aurora.id,
        })
        .await
        .unwrap();
    assert_eq!(deleted.id, aurora.id);
    assert!(service
        .execute(query::development::ById::by(aurora.id))
        .await
        .unwrap()
        .is_none());

    let err = service
        .execute(DeleteBroker { broker_id: john.id })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::delete_broker::ExecutionError::BrokerNotExists(_),
    ));
    let err = service
        .execute(DeleteDevelopment {
            development_id: aurora.id,
        })
        .await
        .unwrap_err()
        .into_inner();
    assert!(matches!(
        err,
        command::delete_development::ExecutionError::DevelopmentNotExists(_),
    ));
}
