use std::path::PathBuf;

use tranlog::{Message, MsgType, TagSettings, logger_config, tlog};

fn main() {
    let dir: PathBuf = std::env::temp_dir().join("tranlog_example_transactions");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let logger = logger_config()
        .with_log_root(&dir)
        .with_log_file_name("app.log")
        .with_tag(
            "orders",
            TagSettings::with_types([MsgType::Info, MsgType::Status])
                .with_log_file_name("orders.log"),
        )
        .build();

    for order in 0..3_u32 {
        let tag = logger.get_transaction(
            &format!("order {order}"),
            &TagSettings::with_types([MsgType::Info, MsgType::Debug])
                .with_log_file_name("orders.log"),
        );
        tlog!(logger, &format!("orders,{tag}"), MsgType::Info, " received order ", order).unwrap();
        tlog!(
            logger,
            &tag,
            MsgType::Debug,
            " payload",
            serde_json::json!({
                "order": order,
                "items": ["widget", "gadget"],
                "express": order % 2 == 0
            })
        )
        .unwrap();
        if order == 2 {
            let err = std::io::Error::other("payment declined");
            tlog!(logger, &tag, MsgType::Error, " order failed", Message::error(&err)).unwrap();
        }
        logger.end_transaction(&tag).unwrap();
    }
    tlog!(logger, "unknown", MsgType::Error, " routed to the default file").unwrap();

    println!("{}", logger.audit("orders", "Status"));
    println!("{}", logger.audit("orders", "Debug"));
    println!("{}", logger.audit("missing", "Error"));

    for name in ["orders.log", "app.log"] {
        println!("\n--- {name} ---");
        print!("{}", std::fs::read_to_string(dir.join(name)).unwrap());
    }
}
