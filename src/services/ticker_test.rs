use super::*;

#[tokio::test]
async fn ticks_carry_generation_and_period_delta() {
    let (tx, mut rx) = mpsc::channel(8);
    let ticker = Ticker::spawn(7, Duration::from_millis(10), tx);
    assert_eq!(ticker.generation(), 7);

    let tick = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("tick timed out")
        .expect("channel closed");
    assert_eq!(tick.generation, 7);
    assert!((tick.delta - 0.01).abs() < 1e-9);
}

#[tokio::test]
async fn dropping_ticker_stops_ticks() {
    let (tx, mut rx) = mpsc::channel(8);
    let ticker = Ticker::spawn(1, Duration::from_millis(5), tx);
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("tick timed out");

    drop(ticker);
    // Drain whatever was queued before the abort landed.
    while let Ok(Some(_)) = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await {}

    // The task owned the only sender; once aborted the channel closes.
    let after = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(matches!(after, Ok(None)));
}

#[tokio::test]
async fn full_channel_drops_ticks_instead_of_blocking() {
    let (tx, mut rx) = mpsc::channel(1);
    let _ticker = Ticker::spawn(3, Duration::from_millis(5), tx);
    tokio::time::sleep(Duration::from_millis(60)).await;

    // Only one tick fits; the rest were dropped, and new ones keep arriving.
    let first = rx.recv().await.expect("channel closed");
    assert_eq!(first.generation, 3);
    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("ticker stalled");
    assert!(next.is_some());
}
