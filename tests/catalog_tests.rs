use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feria_market::catalog;
use feria_market::prelude::*;

fn market(server: &MockServer) -> Marketplace {
    let config = MarketConfig::new(&server.uri(), "anon-key").unwrap();
    Marketplace::new(config).unwrap()
}

#[tokio::test]
async fn search_runs_one_case_insensitive_or_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Producto"))
        .and(query_param("select", "*"))
        .and(query_param(
            "or",
            "(nombre_producto.ilike.*silla*,descripcion_producto.ilike.*silla*)",
        ))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id_producto": 3, "nombre_producto": "Silla de pino", "precio": 25.0, "Usuario_id": "u-1" },
            { "id_producto": 8, "nombre_producto": "Mesa", "precio": 40.5,
              "descripcion_producto": "con silla a juego", "feria_id": "" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let products = market(&server).products().search_remote("  silla ").await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, RecordId::from(3));
    assert_eq!(products[1].price, 40.5);
    assert!(products[1].fair.is_none());
    assert_eq!(catalog::outside_fairs(&products).len(), 2);
}

#[tokio::test]
async fn blank_search_lists_everything() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Producto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let products = market(&server).products().search_remote("   ").await.unwrap();
    assert!(products.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query_pairs().all(|(key, _)| key != "or"));
}

#[tokio::test]
async fn fairs_come_newest_first_and_filter_by_participation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Feria"))
        .and(query_param("order", "fechaInicio.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id_feria": 2, "nombre_feria": "Feria de Navidad", "tipo": "Presencial",
              "fechaInicio": "2024-12-10", "fechaFin": "2024-12-12" },
            { "id_feria": 1, "nombre_feria": "Feria Tech", "tipo": "Virtual",
              "fechaInicio": "2024-05-01T00:00:00", "fechaFin": null }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Participacion"))
        .and(query_param("usuarioId", "eq.u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 10, "usuarioId": "u-1", "feriaID": 1 }
        ])))
        .mount(&server)
        .await;

    let market = market(&server);
    let fairs = market.fairs().list().await.unwrap();
    let joined = market.participations().for_user(&"u-1".into()).await.unwrap();

    assert_eq!(fairs[0].name, "Feria de Navidad");
    assert_eq!(fairs[1].kind, Some(FairKind::Virtual));
    assert!(fairs[1].end_date.is_none());

    let mine = catalog::fairs_joined(&fairs, &joined);
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Feria Tech");
}

#[tokio::test]
async fn joining_twice_keeps_one_participation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Participacion"))
        .and(query_param("feriaID", "eq.4"))
        .and(query_param("usuarioId", "eq.u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/Participacion"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!([{ "usuarioId": "u-1", "feriaID": 4 }])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": 31, "usuarioId": "u-1", "feriaID": 4 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Participacion"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 31, "usuarioId": "u-1", "feriaID": 4 }
        ])))
        .mount(&server)
        .await;

    let market = market(&server);
    let fair = RecordId::from(4);
    let user = RecordId::from("u-1");

    let first = market.participations().join(&fair, &user).await.unwrap();
    let second = market.participations().join(&fair, &user).await.unwrap();
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn comment_threads_carry_their_authors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/comentarios"))
        .and(query_param("productoId", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "productoId": 7, "usuarioId": "u-1", "calificacion": 4,
              "descripcion": "Muy buena", "created_at": "2024-03-01T10:00:00Z" },
            { "id": 2, "productoId": 7, "usuarioId": "u-2", "parentId": 1, "calificacion": 4,
              "descripcion": "Gracias", "created_at": "2024-03-02T10:00:00Z" },
            { "id": 3, "productoId": 7, "usuarioId": "u-2", "calificacion": 2,
              "descripcion": "Llegó tarde", "created_at": "2024-03-05T10:00:00Z" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Usuarios"))
        .and(query_param("id", "in.(u-1,u-2)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "u-1", "nombre": "Ana" },
            { "id": "u-2", "nombre": "Luis" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let thread = market(&server)
        .comments()
        .thread_for_product(&RecordId::from(7))
        .await
        .unwrap();

    assert_eq!(thread.total(), 3);
    assert_eq!(thread.roots[0].item.comment.text, "Llegó tarde");
    assert_eq!(thread.roots[1].item.author_name(), "Ana");
    assert_eq!(thread.roots[1].replies[0].item.author_name(), "Luis");
}

#[tokio::test]
async fn comments_survive_a_failed_author_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/comentarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "productoId": 7, "usuarioId": "u-1", "calificacion": 5, "descripcion": "Bien" }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Usuarios"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;

    let comments = market(&server).comments().for_product(&RecordId::from(7)).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert!(comments[0].author.is_none());
}

#[tokio::test]
async fn replies_inherit_the_parent_rating() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/comentarios"))
        .and(body_partial_json(json!({
            "productoId": 7, "usuarioId": "u-2", "parentId": 1, "calificacion": 3, "descripcion": "De acuerdo"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": 9, "productoId": 7, "usuarioId": "u-2", "parentId": 1,
              "calificacion": 3, "descripcion": "De acuerdo" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "u-2", "nombre": "Luis" }])))
        .mount(&server)
        .await;

    let parent: Comment = serde_json::from_value(json!({
        "id": 1, "productoId": 7, "usuarioId": "u-1", "calificacion": 3, "descripcion": "Regular"
    }))
    .unwrap();

    let reply = market(&server)
        .comments()
        .reply(&parent, &"u-2".into(), "  De acuerdo ")
        .await
        .unwrap();

    assert!(reply.comment.is_reply());
    assert_eq!(reply.comment.rating, Some(3));
    assert_eq!(reply.author_name(), "Luis");
}

#[tokio::test]
async fn editing_a_reply_leaves_its_rating_alone() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/comentarios"))
        .and(query_param("id", "eq.9"))
        .and(body_json(json!({ "descripcion": "Editado" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 9, "productoId": 7, "usuarioId": "u-2", "parentId": 1,
              "calificacion": 3, "descripcion": "Editado" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "u-2", "nombre": "Luis" }])))
        .mount(&server)
        .await;

    let reply: Comment = serde_json::from_value(json!({
        "id": 9, "productoId": 7, "usuarioId": "u-2", "parentId": 1,
        "calificacion": 3, "descripcion": "De acuerdo"
    }))
    .unwrap();

    let edited = market(&server).comments().edit(&reply, " Editado ", Some(1)).await.unwrap();
    assert_eq!(edited.comment.text, "Editado");
    assert_eq!(edited.comment.rating, Some(3));
}

#[tokio::test]
async fn editing_a_top_level_comment_sends_the_new_rating() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/comentarios"))
        .and(query_param("id", "eq.1"))
        .and(body_json(json!({ "descripcion": "Mejor de lo esperado", "calificacion": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "productoId": 7, "usuarioId": "u-1",
              "calificacion": 2, "descripcion": "Mejor de lo esperado" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/Usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "u-1", "nombre": "Ana" }])))
        .mount(&server)
        .await;

    let comment: Comment = serde_json::from_value(json!({
        "id": 1, "productoId": 7, "usuarioId": "u-1", "calificacion": 5, "descripcion": "Bien"
    }))
    .unwrap();

    let edited = market(&server)
        .comments()
        .edit(&comment, "Mejor de lo esperado", Some(2))
        .await
        .unwrap();
    assert_eq!(edited.comment.rating, Some(2));
    assert_eq!(edited.author_name(), "Ana");
}

#[tokio::test]
async fn photos_upload_and_remove() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/storage/v1/object/ImagenesProductos/productos/u-1/silla.png"))
        .and(header("x-upsert", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Key": "ImagenesProductos/productos/u-1/silla.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/storage/v1/object/ImagenesProductos"))
        .and(body_partial_json(json!({ "prefixes": ["productos/u-1/silla.png"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "productos/u-1/silla.png" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let market = market(&server);
    let photo = market
        .photos()
        .upload("ImagenesProductos", "productos/u-1/silla.png", vec![1, 2, 3], Some("image/png"))
        .await
        .unwrap();

    assert_eq!(photo.path, "productos/u-1/silla.png");
    assert_eq!(
        photo.public_url,
        format!("{}/storage/v1/object/public/ImagenesProductos/productos/u-1/silla.png", server.uri())
    );

    market.photos().remove("ImagenesProductos", &photo.path).await.unwrap();
    let err = market.photos().remove("ImagenesProductos", " ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
