//! In-process realtime feed of newly sent conversation messages.
//!
//! One broadcast channel per conversation. Subscribers that fall behind lose
//! the oldest events; there is no replay. A topic is dropped the first time a
//! publish finds it without subscribers.

use dashmap::DashMap;
use futures::Stream;
use marketplace_sdk::Message;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::MessagePublisher;

pub struct MessageFeed {
    topics: DashMap<Uuid, broadcast::Sender<Message>>,
    capacity: usize,
}

impl MessageFeed {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Live messages of one conversation. Dropping the stream unsubscribes.
    pub fn subscribe(&self, conversation_id: Uuid) -> impl Stream<Item = Message> + Send + use<> {
        let rx = self
            .topics
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe();
        debug!(%conversation_id, "Subscribed to conversation feed");

        BroadcastStream::new(rx).filter_map(move |item| match item {
            Ok(message) => Some(message),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(%conversation_id, skipped, "Feed subscriber lagged; events dropped");
                None
            }
        })
    }

    #[must_use]
    pub fn subscriber_count(&self, conversation_id: Uuid) -> usize {
        self.topics
            .get(&conversation_id)
            .map_or(0, |tx| tx.receiver_count())
    }

    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}

impl MessagePublisher for MessageFeed {
    fn publish(&self, message: &Message) {
        let topic = message.conversation_id;
        let delivered = match self.topics.get(&topic) {
            Some(tx) => tx.send(message.clone()).ok(),
            None => return,
        };
        match delivered {
            Some(receivers) => debug!(conversation_id = %topic, receivers, "Published message"),
            None => {
                self.topics.remove_if(&topic, |_, tx| tx.receiver_count() == 0);
                debug!(conversation_id = %topic, "Dropped idle feed topic");
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::pin::pin;
    use std::time::Duration;

    use time::OffsetDateTime;

    use super::*;

    fn message(conversation_id: Uuid, content: &str) -> Message {
        Message {
            id: Uuid::now_v7(),
            conversation_id,
            sender_id: Uuid::new_v4(),
            content: content.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_only_their_topic() {
        let feed = MessageFeed::new(8);
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut sub = pin!(feed.subscribe(a));
        let _other = feed.subscribe(b);

        feed.publish(&message(b, "not for a"));
        feed.publish(&message(a, "hello"));

        let got = tokio::time::timeout(Duration::from_secs(1), sub.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.content, "hello");
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_oldest() {
        let feed = MessageFeed::new(2);
        let topic = Uuid::new_v4();
        let mut sub = pin!(feed.subscribe(topic));
        for i in 0..5 {
            feed.publish(&message(topic, &i.to_string()));
        }
        let first = sub.next().await.unwrap();
        assert_eq!(first.content, "3");
    }

    #[test]
    fn idle_topics_are_pruned_on_publish() {
        let feed = MessageFeed::new(4);
        let topic = Uuid::new_v4();
        drop(feed.subscribe(topic));
        assert_eq!(feed.topic_count(), 1);
        feed.publish(&message(topic, "nobody listens"));
        assert_eq!(feed.topic_count(), 0);
        assert_eq!(feed.subscriber_count(topic), 0);
    }

    #[test]
    fn publish_without_topic_is_a_noop() {
        let feed = MessageFeed::new(4);
        feed.publish(&message(Uuid::new_v4(), "void"));
        assert_eq!(feed.topic_count(), 0);
    }
}
