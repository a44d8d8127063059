use extensions_bridge::{
    BackgroundService, BridgeEvent, BridgeRequest, CannedSpellService, InProcessChannel,
    MemoryStore, MessageChannel,
};
use std::sync::Arc;
use tokio::sync::broadcast;

const PAYLOAD: &str = "<PnuErrorWord nErrorIdx='0' m_nStart='2' m_nEnd='5'>\
    <OrgStr>has</OrgStr><Help nCorrectMethod='2'><![CDATA[verb agreement]]></Help>\
    <CandWordList><CandWord>have</CandWord></CandWordList></PnuErrorWord>";

#[tokio::test]
async fn setup_check_toggle_invalidate_flow() {
    let (bus, mut rx) = broadcast::channel(32);
    let background = BackgroundService::new(MemoryStore::new(), Arc::new(CannedSpellService::new(PAYLOAD)));
    let channel = InProcessChannel::new(background, bus.clone());

    let reply = channel.send(BridgeRequest::CheckSetup).await.expect("context alive");
    assert_eq!(reply.is_setup, Some(false));

    let reply = channel.send(BridgeRequest::check("I has a pen")).await.unwrap();
    assert!(reply.needs_setup);

    let reply = channel
        .send(BridgeRequest::SetApiKey {
            api_key: "secret".into(),
        })
        .await
        .unwrap();
    assert!(reply.success);

    let reply = channel.send(BridgeRequest::check("I has a pen")).await.unwrap();
    assert!(reply.success);
    let result = reply.data.expect("check result");
    assert_eq!(result.source_text, "I has a pen");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].original, "has");

    channel
        .send(BridgeRequest::ToggleExtension { enabled: false })
        .await
        .unwrap();
    let reply = channel.send(BridgeRequest::check("I has a pen")).await.unwrap();
    assert!(reply.disabled);

    channel.invalidate();
    assert!(channel.send(BridgeRequest::check("I has a pen")).await.is_none());

    let mut actions = Vec::new();
    let mut invalidated = false;
    while let Ok(event) = rx.try_recv() {
        match event {
            BridgeEvent::Dispatched { action, .. } => actions.push(action),
            BridgeEvent::Replied { .. } => {}
            BridgeEvent::Invalidated => invalidated = true,
        }
    }
    assert_eq!(
        actions,
        vec![
            "checkSetup",
            "checkSpelling",
            "setApiKey",
            "checkSpelling",
            "toggleExtension",
            "checkSpelling"
        ]
    );
    assert!(invalidated);
}

#[tokio::test]
async fn clear_key_returns_to_setup_state() {
    let (bus, _rx) = broadcast::channel(8);
    let background = BackgroundService::new(MemoryStore::new(), Arc::new(CannedSpellService::new("")));
    let channel = InProcessChannel::new(background.clone(), bus);

    channel
        .send(BridgeRequest::SetApiKey {
            api_key: "secret".into(),
        })
        .await
        .unwrap();
    assert!(background.credentials().is_setup().await.unwrap());

    channel.send(BridgeRequest::ClearApiKey).await.unwrap();
    let reply = channel.send(BridgeRequest::CheckSetup).await.unwrap();
    assert_eq!(reply.is_setup, Some(false));
}
