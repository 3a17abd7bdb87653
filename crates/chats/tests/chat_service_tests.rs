use voltchat_chats::{ChatError, ChatEvent, ChatService, Participant, Role, GENERAL_SERVER_ID};
use voltchat_config::ChatConfig;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

struct TestContext {
    chats: ChatService,
    owner: Participant,
    guest: Participant,
}

impl TestContext {
    fn new(config: ChatConfig) -> Self {
        Self {
            chats: ChatService::new(&config),
            owner: participant("olivia"),
            guest: participant("gus"),
        }
    }

    fn with_defaults() -> Self {
        Self::new(ChatConfig::default())
    }
}

fn participant(name: &str) -> Participant {
    Participant {
        user_id: format!("id-{name}"),
        email: format!("{name}@example.com"),
        username: name.to_string(),
        display_name: format!("{name} display"),
        profile_picture: format!("https://example.com/{name}.png"),
    }
}

mod server_tests {
    use super::*;

    #[tokio::test]
    async fn created_server_is_private_and_owned() -> TestResult {
        let ctx = TestContext::with_defaults();

        let view = ctx
            .chats
            .create_server("  Raid Night ", Some("  weekly  "), &ctx.owner)
            .await?;

        assert!(view.server.id.starts_with("server_"));
        assert_eq!(view.server.name, "Raid Night");
        assert_eq!(view.server.description, "weekly");
        assert_eq!(view.server.owner_id, "olivia");
        assert_eq!(view.server.invite_code.len(), 8);
        assert!(!view.server.is_public);
        assert_eq!(view.member_count, 1);
        assert_eq!(view.user_role, Some(Role::Owner));
        assert!(view.joined_at.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn blank_or_long_names_are_rejected() {
        let ctx = TestContext::with_defaults();

        let error = ctx
            .chats
            .create_server("   ", None, &ctx.owner)
            .await
            .expect_err("blank name");
        assert!(matches!(error, ChatError::Validation { .. }));

        let error = ctx
            .chats
            .create_server(&"x".repeat(101), None, &ctx.owner)
            .await
            .expect_err("long name");
        assert!(matches!(error, ChatError::Validation { .. }));

        let error = ctx
            .chats
            .create_server("ok", Some(&"d".repeat(501)), &ctx.owner)
            .await
            .expect_err("long description");
        assert!(matches!(error, ChatError::Validation { .. }));
    }

    #[tokio::test]
    async fn listing_shows_public_and_joined_servers_only() -> TestResult {
        let ctx = TestContext::with_defaults();
        let private = ctx.chats.create_server("Secret", None, &ctx.owner).await?;

        let owner_view = ctx.chats.list_servers(&ctx.owner.email).await;
        let ids: Vec<_> = owner_view.iter().map(|v| v.server.id.as_str()).collect();
        assert_eq!(ids, vec![GENERAL_SERVER_ID, private.server.id.as_str()]);
        assert_eq!(owner_view[0].user_role, Some(Role::Member));
        assert_eq!(owner_view[0].joined_at, None);
        assert_eq!(owner_view[1].user_role, Some(Role::Owner));

        let guest_view = ctx.chats.list_servers(&ctx.guest.email).await;
        assert_eq!(guest_view.len(), 1);
        assert_eq!(guest_view[0].server.id, GENERAL_SERVER_ID);
        Ok(())
    }

    #[tokio::test]
    async fn joining_by_invite_adds_member() -> TestResult {
        let ctx = TestContext::with_defaults();
        let created = ctx.chats.create_server("Club", None, &ctx.owner).await?;

        let joined = ctx
            .chats
            .join_server(&created.server.invite_code, &ctx.guest)
            .await?;
        assert_eq!(joined.user_role, Some(Role::Member));
        assert_eq!(joined.member_count, 2);

        let members = ctx.chats.members(&created.server.id).await?;
        let names: Vec<_> = members.iter().map(|m| m.username.as_str()).collect();
        assert_eq!(names, vec!["olivia", "gus"]);

        let error = ctx
            .chats
            .join_server(&created.server.invite_code, &ctx.guest)
            .await
            .expect_err("second join");
        assert!(matches!(error, ChatError::AlreadyMember));

        let error = ctx
            .chats
            .join_server("nope1234", &ctx.guest)
            .await
            .expect_err("bad code");
        assert!(matches!(error, ChatError::InvalidInvite));
        Ok(())
    }

    #[tokio::test]
    async fn member_leaving_keeps_server() -> TestResult {
        let ctx = TestContext::with_defaults();
        let created = ctx.chats.create_server("Club", None, &ctx.owner).await?;
        ctx.chats
            .join_server(&created.server.invite_code, &ctx.guest)
            .await?;

        let deleted = ctx
            .chats
            .leave_server(&created.server.id, &ctx.guest.email)
            .await?;
        assert!(!deleted);
        assert_eq!(ctx.chats.get_server(&created.server.id).await?.member_count, 1);

        let error = ctx
            .chats
            .leave_server(&created.server.id, &ctx.guest.email)
            .await
            .expect_err("already left");
        assert!(matches!(error, ChatError::NotMember));
        Ok(())
    }

    #[tokio::test]
    async fn owner_leaving_deletes_server_members_and_feed() -> TestResult {
        let ctx = TestContext::with_defaults();
        let created = ctx.chats.create_server("Club", None, &ctx.owner).await?;
        let id = created.server.id.clone();
        ctx.chats
            .join_server(&created.server.invite_code, &ctx.guest)
            .await?;
        ctx.chats.post_message(&id, &ctx.guest, "hi").await?;

        let deleted = ctx.chats.leave_server(&id, &ctx.owner.email).await?;
        assert!(deleted);

        assert!(matches!(
            ctx.chats.get_server(&id).await,
            Err(ChatError::ServerNotFound { .. })
        ));
        assert!(matches!(
            ctx.chats.messages_since(&id, None).await,
            Err(ChatError::ServerNotFound { .. })
        ));
        assert_eq!(ctx.chats.membership_stats("gus").await.server_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn general_cannot_be_left() {
        let ctx = TestContext::with_defaults();
        let error = ctx
            .chats
            .leave_server(GENERAL_SERVER_ID, &ctx.owner.email)
            .await
            .expect_err("general");
        assert!(matches!(error, ChatError::CannotLeaveGeneral));

        let error = ctx
            .chats
            .leave_server("server_missing", &ctx.owner.email)
            .await
            .expect_err("missing");
        assert!(matches!(error, ChatError::ServerNotFound { .. }));
    }

    #[tokio::test]
    async fn private_servers_are_readable_by_members_only() -> TestResult {
        let ctx = TestContext::with_defaults();
        let created = ctx.chats.create_server("Club", None, &ctx.owner).await?;

        ctx.chats.can_read(GENERAL_SERVER_ID, &ctx.guest.email).await?;
        ctx.chats.can_read(&created.server.id, &ctx.owner.email).await?;
        assert!(matches!(
            ctx.chats.can_read(&created.server.id, &ctx.guest.email).await,
            Err(ChatError::NotMember)
        ));
        Ok(())
    }
}

mod message_tests {
    use super::*;

    #[tokio::test]
    async fn posted_messages_carry_author_details() -> TestResult {
        let ctx = TestContext::with_defaults();
        let message = ctx
            .chats
            .post_message(GENERAL_SERVER_ID, &ctx.owner, "  hello  ")
            .await?;

        assert!(message.id.starts_with("msg_"));
        assert_eq!(message.text, "hello");
        assert_eq!(message.username, "olivia");
        assert_eq!(message.display_name, "olivia display");
        assert_eq!(message.profile_picture, "https://example.com/olivia.png");
        assert_eq!(message.server_id, GENERAL_SERVER_ID);
        Ok(())
    }

    #[tokio::test]
    async fn blank_and_oversized_messages_are_rejected() {
        let ctx = TestContext::new(ChatConfig {
            max_message_length: 5,
            ..ChatConfig::default()
        });

        assert!(matches!(
            ctx.chats.post_message(GENERAL_SERVER_ID, &ctx.owner, "  ").await,
            Err(ChatError::Validation { .. })
        ));
        assert!(matches!(
            ctx.chats
                .post_message(GENERAL_SERVER_ID, &ctx.owner, "too long")
                .await,
            Err(ChatError::Validation { .. })
        ));
        assert!(matches!(
            ctx.chats.post_message("server_missing", &ctx.owner, "hi").await,
            Err(ChatError::ServerNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn feed_keeps_only_newest_messages() -> TestResult {
        let ctx = TestContext::new(ChatConfig {
            max_messages_per_server: 3,
            ..ChatConfig::default()
        });
        for i in 0..5 {
            ctx.chats
                .post_message(GENERAL_SERVER_ID, &ctx.owner, &format!("m{i}"))
                .await?;
        }

        let texts: Vec<_> = ctx
            .chats
            .messages_since(GENERAL_SERVER_ID, None)
            .await?
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);
        Ok(())
    }

    #[tokio::test]
    async fn since_returns_only_newer_messages() -> TestResult {
        let ctx = TestContext::with_defaults();
        let first = ctx
            .chats
            .post_message(GENERAL_SERVER_ID, &ctx.owner, "one")
            .await?;
        let second = ctx
            .chats
            .post_message(GENERAL_SERVER_ID, &ctx.guest, "two")
            .await?;

        let newer = ctx
            .chats
            .messages_since(GENERAL_SERVER_ID, Some(first.timestamp))
            .await?;
        assert_eq!(newer, vec![second.clone()]);

        let none = ctx
            .chats
            .messages_since(GENERAL_SERVER_ID, Some(second.timestamp))
            .await?;
        assert!(none.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn after_id_falls_back_to_whole_feed() -> TestResult {
        let ctx = TestContext::with_defaults();
        let first = ctx
            .chats
            .post_message(GENERAL_SERVER_ID, &ctx.owner, "one")
            .await?;
        ctx.chats
            .post_message(GENERAL_SERVER_ID, &ctx.owner, "two")
            .await?;

        let after = ctx
            .chats
            .messages_after(GENERAL_SERVER_ID, Some(&first.id))
            .await?;
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].text, "two");

        let unknown = ctx
            .chats
            .messages_after(GENERAL_SERVER_ID, Some("msg_gone"))
            .await?;
        assert_eq!(unknown.len(), 2);

        let all = ctx.chats.messages_after(GENERAL_SERVER_ID, None).await?;
        assert_eq!(all.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn feeds_are_isolated_per_server() -> TestResult {
        let ctx = TestContext::with_defaults();
        let created = ctx.chats.create_server("Club", None, &ctx.owner).await?;
        ctx.chats
            .post_message(&created.server.id, &ctx.owner, "private")
            .await?;

        assert!(ctx
            .chats
            .messages_since(GENERAL_SERVER_ID, None)
            .await?
            .is_empty());
        assert_eq!(
            ctx.chats
                .messages_since(&created.server.id, None)
                .await?
                .len(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn clear_reports_removed_count() -> TestResult {
        let ctx = TestContext::with_defaults();
        for text in ["a", "b", "c"] {
            ctx.chats
                .post_message(GENERAL_SERVER_ID, &ctx.owner, text)
                .await?;
        }

        assert_eq!(ctx.chats.clear(GENERAL_SERVER_ID).await?, 3);
        assert_eq!(ctx.chats.clear(GENERAL_SERVER_ID).await?, 0);
        assert!(ctx
            .chats
            .messages_since(GENERAL_SERVER_ID, None)
            .await?
            .is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn posting_marks_author_online() -> TestResult {
        let ctx = TestContext::with_defaults();
        ctx.chats
            .post_message(GENERAL_SERVER_ID, &ctx.owner, "hi")
            .await?;
        ctx.chats.touch(GENERAL_SERVER_ID, "gus").await;

        assert_eq!(
            ctx.chats.online_users(GENERAL_SERVER_ID).await,
            vec!["gus", "olivia"]
        );
        Ok(())
    }
}

mod event_tests {
    use super::*;

    #[tokio::test]
    async fn posts_and_clears_are_broadcast() -> TestResult {
        let ctx = TestContext::with_defaults();
        let mut events = ctx.chats.subscribe();

        let message = ctx
            .chats
            .post_message(GENERAL_SERVER_ID, &ctx.owner, "hi")
            .await?;
        ctx.chats.clear(GENERAL_SERVER_ID).await?;

        match events.recv().await? {
            ChatEvent::Message { message: received } => assert_eq!(received, message),
            other => panic!("unexpected event {other:?}"),
        }
        match events.recv().await? {
            ChatEvent::Clear { server_id } => assert_eq!(server_id, GENERAL_SERVER_ID),
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn owner_leaving_publishes_deleted() -> TestResult {
        let ctx = TestContext::with_defaults();
        let view = ctx.chats.create_server("Short lived", None, &ctx.owner).await?;
        let mut events = ctx.chats.subscribe();

        assert!(ctx.chats.leave_server(&view.server.id, &ctx.owner.email).await?);

        match events.recv().await? {
            ChatEvent::Deleted { server_id } => assert_eq!(server_id, view.server.id),
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn member_leaving_publishes_nothing() -> TestResult {
        let ctx = TestContext::with_defaults();
        let view = ctx.chats.create_server("Sticky", None, &ctx.owner).await?;
        ctx.chats
            .join_server(&view.server.invite_code, &ctx.guest)
            .await?;
        let mut events = ctx.chats.subscribe();

        assert!(!ctx.chats.leave_server(&view.server.id, &ctx.guest.email).await?);
        assert!(events.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn message_event_json_matches_stream_format() -> TestResult {
        let ctx = TestContext::with_defaults();
        let mut events = ctx.chats.subscribe();
        ctx.chats
            .post_message(GENERAL_SERVER_ID, &ctx.owner, "hi")
            .await?;

        let event = events.recv().await?;
        let json = serde_json::to_value(&event)?;
        assert_eq!(json["type"], "message");
        assert_eq!(json["message"]["text"], "hi");
        assert_eq!(json["message"]["serverId"], GENERAL_SERVER_ID);
        assert_eq!(json["message"]["displayName"], "olivia display");
        Ok(())
    }
}
