use std::io::Write;

use assert_cmd::Command;
use predicates as pred;
use tempfile::NamedTempFile;

#[test]
fn end_to_end_distributes_settles_and_reports() {
    // Seed: vendor 100, reseller 101, a referrer with a code, and an 8%
    // rule for electronics.
    let mut accounts = NamedTempFile::new().expect("create accounts file");
    write!(
        accounts,
        r#"{{
            "accounts": [
                {{"id": 100, "is_vendor": true}},
                {{"id": 101, "is_reseller": true}},
                {{"id": 400, "referral_code": "FRIEND10"}}
            ],
            "commission_rules": {{"electronics": 8}}
        }}"#
    )
    .unwrap();

    // Order 1: delivered product — funds held, no wallet movement yet.
    // Order 2: completed ride by the reseller — 7% fee, paid out now.
    // Order 3: delivered then refunded — customer 200 made whole.
    // The "zzz" row is malformed and must be skipped, not fatal.
    let mut events = NamedTempFile::new().expect("create events file");
    writeln!(
        events,
        "order_id,previous_status,new_status,vendor_id,customer_id,total,category,delivery_fee,delivery_man_id,referral_code,payment_method\n\
        1,Out for Delivery,Delivered,100,200,1000,electronics,,,,wallet\n\
        2,Ride Accepted,Ride Completed,101,201,500,ride,,,,wallet\n\
        zzz\n\
        3,Out for Delivery,Delivered,100,200,200,books,,,,wallet\n\
        3,Delivered,Refund Approved,100,200,200,books,,,,wallet"
    )
    .unwrap();

    let exe = env!("CARGO_BIN_EXE_settlement_engine");
    let mut cmd = Command::new(exe);
    cmd.arg(events.path()).arg(accounts.path());

    cmd.assert()
        .success()
        .stdout(pred::str::contains("account,wallet_balance,payout_requested"))
        // Vendor 100's product revenue is still inside the 3-day hold.
        .stdout(pred::str::contains("100,0,false"))
        // Reseller: 500 - 7% = 465, immediately spendable.
        .stdout(pred::str::contains("101,465,false"))
        // Refunded customer got the full total back.
        .stdout(pred::str::contains("200,200,false"))
        // Platform earned only the ride fee so far.
        .stdout(pred::str::contains("platform_total,35"));
}

#[test]
fn missing_events_argument_fails() {
    let exe = env!("CARGO_BIN_EXE_settlement_engine");
    Command::new(exe).assert().failure();
}
