use momo_import::{load_file, ImportSummary};
use momo_storage::{
    category_counts, create_db, list_messages, statistics, MessageFilter, PageRequest,
    SqliteMessageStore,
};

const BACKUP: &str = r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>
<smses count="5">
  <sms protocol="0" address="M-Money" date="1715351458724" type="1" body="You have received 2000 RWF from Jane Smith (*********013) on your mobile money account at 2024-05-10 16:30:51. Your new balance:2000 RWF. Financial Transaction Id: 76662021700." />
  <sms protocol="0" address="M-Money" date="1715351506754" type="1" body="TxId: 73214484437. Your payment of 1,000 RWF to Jane Smith 12845 has been completed at 2024-05-10 16:31:39. Your new balance: 1,000 RWF. Fee was 0 RWF." />
  <sms protocol="0" address="M-Money" date="1715452495316" type="1" body="*165*S*10000 RWF transferred to Samuel Carter (250791666666) from 36521838 at 2024-05-11 20:34:47 . Fee was: 100 RWF. New balance: 28300 RWF." />
  <sms protocol="0" address="+250795963036" date="1715500000000" type="1" body="Your one-time password is 4432" />
  <sms protocol="0" address="M-Money" date="oops" type="1" body="unreadable" />
</smses>"#;

#[tokio::test]
async fn backup_file_lands_in_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("modified_sms_v2.xml");
    std::fs::write(&path, BACKUP).unwrap();

    let pool = create_db("sqlite::memory:").await.unwrap();
    let store = SqliteMessageStore::new(pool.clone());

    let summary = load_file(&path, &store).await.unwrap();
    assert_eq!(summary, ImportSummary { processed: 4, skipped: 1 });

    let stats = statistics(&pool).await.unwrap();
    assert_eq!(stats.total_messages, 4);
    assert_eq!(stats.total_transactions, 3);

    let counts = category_counts(&pool).await.unwrap();
    assert!(counts.contains(&("Transfers to Mobile Numbers".to_string(), 1)));
    assert!(counts.contains(&("Transactions Initiated by Third Parties".to_string(), 1)));

    let transfers = list_messages(
        &pool,
        &MessageFilter {
            category: Some("Transfers to Mobile Numbers".to_string()),
            ..Default::default()
        },
        PageRequest::default(),
    )
    .await
    .unwrap();
    let transfer = &transfers.messages[0];
    assert_eq!(transfer.recipient_phone.as_deref(), Some("250791666666"));
    assert_eq!(transfer.recipient_name.as_deref(), Some("Samuel Carter"));
    assert_eq!(transfer.status.as_deref(), Some("completed"));
}
