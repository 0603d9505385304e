use std::time::Duration;

use event_time::Event;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};

const EVENT_FIELDS: &str = "id title date endDate startTime endTime location aboutEvent details \
    organizer contactDetails hostingOrganization photoUrls attachmentUrls owner createdAt updatedAt";

const PAGE_SIZE: u32 = 100;

/// Client for the hosted GraphQL event API.
pub struct Upstream {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct Request<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct Response<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetEvent {
    get_event: Option<Event>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEvents {
    list_events: Page,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    #[serde(default)]
    items: Vec<Option<Event>>,
    next_token: Option<String>,
}

impl Upstream {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let query = format!("query GetEvent($id: ID!) {{ getEvent(id: $id) {{ {EVENT_FIELDS} }} }}");
        let data: GetEvent = self.execute(&query, json!({ "id": id })).await?;
        Ok(data.get_event)
    }

    /// Fetches every event, following pagination tokens until exhausted.
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let query = format!(
            "query ListEvents($limit: Int, $nextToken: String) {{ \
             listEvents(limit: $limit, nextToken: $nextToken) {{ items {{ {EVENT_FIELDS} }} nextToken }} }}"
        );

        let mut events = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let variables = json!({ "limit": PAGE_SIZE, "nextToken": next_token });
            let data: ListEvents = self.execute(&query, variables).await?;

            events.extend(data.list_events.items.into_iter().flatten());

            match data.list_events.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
        tracing::debug!(count = events.len(), "listed events");

        Ok(events)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&Request { query, variables });

        if let Some(api_key) = &self.api_key {
            request = request.header("x-api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body: Response<T> = response.json().await?;

        if !body.errors.is_empty() {
            let messages = body
                .errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>();
            return Err(Error::Graphql(messages.join("; ")));
        }

        body.data
            .ok_or_else(|| Error::Graphql("response carried no data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    const RALLY: &str = r#"{
        "id": "e1",
        "title": "Rally",
        "date": "2026-08-08",
        "startTime": "2:00 PM",
        "endTime": "4:00 PM",
        "location": "Honolulu",
        "organizer": "HRP",
        "photoUrls": [],
        "attachmentUrls": []
    }"#;

    #[test_log::test(tokio::test)]
    async fn fetches_single_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("x-api-key", "da2-key")
            .match_body(Matcher::PartialJson(json!({ "variables": { "id": "e1" } })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"data":{{"getEvent":{RALLY}}}}}"#))
            .create_async()
            .await;

        let upstream =
            Upstream::new(format!("{}/graphql", server.url()), Some("da2-key".into())).unwrap();
        let event = upstream.get_event("e1").await.unwrap().unwrap();

        assert_eq!(event.title, "Rally");
        assert_eq!(event.start_time.as_deref(), Some("2:00 PM"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_event_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data":{"getEvent":null}}"#)
            .create_async()
            .await;

        let upstream = Upstream::new(format!("{}/graphql", server.url()), None).unwrap();

        assert!(upstream.get_event("gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn graphql_errors_are_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data":null,"errors":[{"message":"Unauthorized"},{"message":"Try again"}]}"#)
            .create_async()
            .await;

        let upstream = Upstream::new(format!("{}/graphql", server.url()), None).unwrap();
        let err = upstream.get_event("e1").await.unwrap_err();

        assert!(matches!(err, Error::Graphql(ref message) if message == "Unauthorized; Try again"));
    }

    #[tokio::test]
    async fn http_failures_are_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(503)
            .create_async()
            .await;

        let upstream = Upstream::new(format!("{}/graphql", server.url()), None).unwrap();

        assert!(matches!(
            upstream.list_events().await,
            Err(Error::Status(503))
        ));
    }

    #[tokio::test]
    async fn follows_pagination() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({ "variables": { "nextToken": null } })))
            .with_status(200)
            .with_body(format!(
                r#"{{"data":{{"listEvents":{{"items":[{RALLY}],"nextToken":"page-2"}}}}}}"#
            ))
            .create_async()
            .await;
        let second = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({ "variables": { "nextToken": "page-2" } })))
            .with_status(200)
            .with_body(
                r#"{"data":{"listEvents":{"items":[
                    {"id":"e0","title":"Caucus","date":"2026-03-01"},
                    null
                ],"nextToken":null}}}"#,
            )
            .create_async()
            .await;

        let upstream = Upstream::new(format!("{}/graphql", server.url()), None).unwrap();
        let events = upstream.list_events().await.unwrap();

        let ids = events.iter().map(|event| event.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["e0", "e1"]);
        first.assert_async().await;
        second.assert_async().await;
    }
}
