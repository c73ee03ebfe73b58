//! GraphQL API tests: the schema executed in-process over the in-memory store

use std::sync::Arc;

use serde_json::{json, Value};

use crmctl_core::{CrmService, MemoryStore};
use crmctl_server::{build_schema, execute_json, CrmSchema};

fn schema() -> CrmSchema {
    build_schema(CrmService::new(Arc::new(MemoryStore::new())))
}

async fn run(schema: &CrmSchema, query: &str, variables: Value) -> Value {
    execute_json(schema, query, Some(variables)).await
}

fn first_error(response: &Value) -> (&str, &str) {
    let error = &response["errors"][0];
    (
        error["message"].as_str().unwrap_or_default(),
        error["extensions"]["code"].as_str().unwrap_or_default(),
    )
}

const CREATE_CUSTOMER: &str = r#"
    mutation($input: CustomerInput!) {
        createCustomer(input: $input) { customer { id name email phone } message }
    }
"#;

const CREATE_PRODUCT: &str = r#"
    mutation($input: ProductInput!) {
        createProduct(input: $input) { product { id name price stock } message }
    }
"#;

const CREATE_ORDER: &str = r#"
    mutation($input: OrderInput!) {
        createOrder(input: $input) {
            order { id totalAmount customer { name } products { name } }
            message
        }
    }
"#;

async fn customer(schema: &CrmSchema, name: &str, email: &str, phone: Option<&str>) -> String {
    let resp = run(
        schema,
        CREATE_CUSTOMER,
        json!({ "input": { "name": name, "email": email, "phone": phone } }),
    )
    .await;
    resp["data"]["createCustomer"]["customer"]["id"]
        .as_str()
        .expect("customer id")
        .to_string()
}

async fn product(schema: &CrmSchema, name: &str, price: &str, stock: i32) -> String {
    let resp = run(
        schema,
        CREATE_PRODUCT,
        json!({ "input": { "name": name, "price": price, "stock": stock } }),
    )
    .await;
    resp["data"]["createProduct"]["product"]["id"]
        .as_str()
        .expect("product id")
        .to_string()
}

#[tokio::test]
async fn hello() {
    let resp = execute_json(&schema(), "{ hello }", None).await;
    assert_eq!(resp["data"]["hello"], "Hello, GraphQL!");
}

#[tokio::test]
async fn create_customer_and_reject_duplicate() {
    let schema = schema();
    let input = json!({ "input": { "name": "Alice", "email": "alice@example.com", "phone": "+12345678901" } });

    let resp = run(&schema, CREATE_CUSTOMER, input.clone()).await;
    assert_eq!(resp["data"]["createCustomer"]["message"], "Customer created successfully.");
    assert_eq!(resp["data"]["createCustomer"]["customer"]["phone"], "+12345678901");

    let resp = run(&schema, CREATE_CUSTOMER, input).await;
    assert_eq!(first_error(&resp), ("Email already exists.", "VALIDATION"));
}

#[tokio::test]
async fn create_customer_rejects_bad_phone() {
    let resp = run(
        &schema(),
        CREATE_CUSTOMER,
        json!({ "input": { "name": "Bob", "email": "bob@example.com", "phone": "12345" } }),
    )
    .await;
    assert_eq!(first_error(&resp), ("Invalid phone number format.", "VALIDATION"));
}

#[tokio::test]
async fn bulk_create_reports_duplicates_and_keeps_valid() {
    let schema = schema();
    let resp = run(
        &schema,
        r#"
        mutation($input: [CustomerInput!]!) {
            bulkCreateCustomers(input: $input) { customers { email } errors { email errors } }
        }
        "#,
        json!({ "input": [
            { "name": "A", "email": "a@example.com" },
            { "name": "A again", "email": "a@example.com" },
            { "name": "C", "email": "c@example.com", "phone": "123-456-7890" }
        ]}),
    )
    .await;

    let payload = &resp["data"]["bulkCreateCustomers"];
    assert_eq!(payload["customers"].as_array().unwrap().len(), 2);
    assert_eq!(
        payload["errors"],
        json!([{ "email": "a@example.com", "errors": ["Email already exists."] }])
    );

    let resp = execute_json(&schema, "{ allCustomers { totalCount } }", None).await;
    assert_eq!(resp["data"]["allCustomers"]["totalCount"], 2);
}

#[tokio::test]
async fn create_product_validation() {
    let schema = schema();
    let resp = run(
        &schema,
        CREATE_PRODUCT,
        json!({ "input": { "name": "Free", "price": "0", "stock": 1 } }),
    )
    .await;
    assert_eq!(first_error(&resp), ("Price must be positive.", "VALIDATION"));

    let resp = run(
        &schema,
        CREATE_PRODUCT,
        json!({ "input": { "name": "Pen", "price": "1.00", "stock": -1 } }),
    )
    .await;
    assert_eq!(first_error(&resp), ("Stock cannot be negative.", "VALIDATION"));

    let resp = run(
        &schema,
        CREATE_PRODUCT,
        json!({ "input": { "name": "Pin", "price": "0.01" } }),
    )
    .await;
    assert_eq!(resp["data"]["createProduct"]["product"]["stock"], 0);
    assert_eq!(resp["data"]["createProduct"]["message"], "Product created successfully.");
}

#[tokio::test]
async fn create_order_totals_prices() {
    let schema = schema();
    let alice = customer(&schema, "Alice", "alice@example.com", None).await;
    let a = product(&schema, "Keyboard", "10.00", 5).await;
    let b = product(&schema, "Mouse", "5.00", 5).await;

    let resp = run(
        &schema,
        CREATE_ORDER,
        json!({ "input": { "customerId": alice, "productIds": [a, b] } }),
    )
    .await;
    let order = &resp["data"]["createOrder"]["order"];
    assert_eq!(order["totalAmount"], "15.00");
    assert_eq!(order["customer"]["name"], "Alice");
    assert_eq!(order["products"], json!([{ "name": "Keyboard" }, { "name": "Mouse" }]));
    assert_eq!(resp["data"]["createOrder"]["message"], "Order created successfully.");
}

#[tokio::test]
async fn create_order_errors() {
    let schema = schema();
    let alice = customer(&schema, "Alice", "alice@example.com", None).await;
    let a = product(&schema, "Keyboard", "10.00", 5).await;

    let resp = run(
        &schema,
        CREATE_ORDER,
        json!({ "input": { "customerId": alice, "productIds": [] } }),
    )
    .await;
    assert_eq!(
        first_error(&resp),
        ("At least one product must be selected.", "VALIDATION")
    );

    let resp = run(
        &schema,
        CREATE_ORDER,
        json!({ "input": { "customerId": "999", "productIds": [a] } }),
    )
    .await;
    assert_eq!(first_error(&resp), ("Invalid customer ID.", "VALIDATION"));

    let resp = run(
        &schema,
        CREATE_ORDER,
        json!({ "input": { "customerId": alice, "productIds": ["77", a, "78"] } }),
    )
    .await;
    assert_eq!(first_error(&resp), ("Invalid product IDs: 77, 78", "VALIDATION"));

    let resp = execute_json(&schema, "{ allOrders { totalCount } }", None).await;
    assert_eq!(resp["data"]["allOrders"]["totalCount"], 0);
}

#[tokio::test]
async fn update_low_stock_products() {
    let schema = schema();
    product(&schema, "Low", "1.00", 3).await;
    product(&schema, "Enough", "1.00", 10).await;

    let resp = execute_json(
        &schema,
        "mutation { updateLowStockProducts { success message updatedProducts { name stock } } }",
        None,
    )
    .await;
    assert_eq!(
        resp["data"]["updateLowStockProducts"],
        json!({
            "success": true,
            "message": "1 products updated.",
            "updatedProducts": [{ "name": "Low", "stock": 13 }]
        })
    );
}

#[tokio::test]
async fn list_filters_sorts_and_pages() {
    let schema = schema();
    customer(&schema, "Zed", "zed@example.com", Some("+12345678901")).await;
    customer(&schema, "alice", "alice@example.com", None).await;
    customer(&schema, "Alicia", "alicia@example.com", Some("123-456-7890")).await;

    let resp = execute_json(
        &schema,
        r#"{ allCustomers(customerName: "ALI", orderBy: ["-name"]) {
                totalCount edges { node { name } } } }"#,
        None,
    )
    .await;
    assert_eq!(resp["data"]["allCustomers"]["totalCount"], 2);
    assert_eq!(
        resp["data"]["allCustomers"]["edges"],
        json!([{ "node": { "name": "alice" } }, { "node": { "name": "Alicia" } }])
    );

    let resp = execute_json(
        &schema,
        r#"{ allCustomers(phonePattern: "+1") { edges { node { name } } } }"#,
        None,
    )
    .await;
    assert_eq!(resp["data"]["allCustomers"]["edges"], json!([{ "node": { "name": "Zed" } }]));

    let resp = execute_json(
        &schema,
        r#"{ allCustomers(first: 2) { pageInfo { hasNextPage endCursor } edges { node { name } } } }"#,
        None,
    )
    .await;
    let page = &resp["data"]["allCustomers"];
    assert_eq!(page["pageInfo"]["hasNextPage"], true);
    let cursor = page["pageInfo"]["endCursor"].as_str().unwrap().to_string();

    let resp = run(
        &schema,
        r#"query($after: String) { allCustomers(first: 2, after: $after) {
                pageInfo { hasNextPage hasPreviousPage } edges { node { name } } } }"#,
        json!({ "after": cursor }),
    )
    .await;
    let page = &resp["data"]["allCustomers"];
    assert_eq!(page["pageInfo"]["hasNextPage"], false);
    assert_eq!(page["pageInfo"]["hasPreviousPage"], true);
    assert_eq!(page["edges"], json!([{ "node": { "name": "Alicia" } }]));
}

#[tokio::test]
async fn empty_window_has_no_next_page() {
    let schema = schema();
    customer(&schema, "Alice", "alice@example.com", None).await;
    customer(&schema, "Bob", "bob@example.com", None).await;

    let resp = run(
        &schema,
        r#"{ allCustomers(first: 0) { totalCount pageInfo { hasNextPage } edges { node { name } } } }"#,
        json!({}),
    )
    .await;
    let page = &resp["data"]["allCustomers"];
    assert_eq!(page["totalCount"], 2);
    assert_eq!(page["edges"].as_array().map(Vec::len), Some(0));
    assert_eq!(page["pageInfo"]["hasNextPage"], false);
}

#[tokio::test]
async fn unknown_sort_field_is_bad_query() {
    let resp = execute_json(
        &schema(),
        r#"{ allProducts(orderBy: ["colour"]) { totalCount } }"#,
        None,
    )
    .await;
    assert_eq!(
        first_error(&resp),
        ("Unknown sort field 'colour' for product", "BAD_QUERY")
    );
}

#[tokio::test]
async fn product_range_filters() {
    let schema = schema();
    product(&schema, "Cheap", "2.50", 1).await;
    product(&schema, "Mid", "20.00", 50).await;
    product(&schema, "Dear", "200.00", 5).await;

    let resp = execute_json(
        &schema,
        r#"{ allProducts(priceGte: "2.50", priceLte: "20", orderBy: ["-price"]) { edges { node { name } } } }"#,
        None,
    )
    .await;
    assert_eq!(
        resp["data"]["allProducts"]["edges"],
        json!([{ "node": { "name": "Mid" } }, { "node": { "name": "Cheap" } }])
    );

    let resp = execute_json(
        &schema,
        r#"{ allProducts(lowStock: true, orderBy: ["stock"]) { edges { node { name } } } }"#,
        None,
    )
    .await;
    assert_eq!(
        resp["data"]["allProducts"]["edges"],
        json!([{ "node": { "name": "Cheap" } }, { "node": { "name": "Dear" } }])
    );
}

#[tokio::test]
async fn orders_filter_by_date_and_customer() {
    let schema = schema();
    let alice = customer(&schema, "Alice", "alice@example.com", None).await;
    let bob = customer(&schema, "Bob", "bob@example.com", None).await;
    let pen = product(&schema, "Pen", "1.50", 100).await;

    for (who, date) in [
        (&alice, "2024-01-01T09:00:00Z"),
        (&bob, "2024-03-01T09:00:00Z"),
        (&alice, "2024-03-05T09:00:00Z"),
    ] {
        run(
            &schema,
            CREATE_ORDER,
            json!({ "input": { "customerId": who, "productIds": [pen], "orderDate": date } }),
        )
        .await;
    }

    let resp = run(
        &schema,
        r#"query($since: DateTime) { allOrders(orderDateGte: $since, orderBy: ["-order_date"]) {
                totalCount edges { node { customer { email } } } } }"#,
        json!({ "since": "2024-02-01T00:00:00Z" }),
    )
    .await;
    assert_eq!(resp["data"]["allOrders"]["totalCount"], 2);
    assert_eq!(
        resp["data"]["allOrders"]["edges"],
        json!([
            { "node": { "customer": { "email": "alice@example.com" } } },
            { "node": { "customer": { "email": "bob@example.com" } } }
        ])
    );

    let resp = execute_json(
        &schema,
        r#"{ allOrders(customerName: "ali", productName: "PEN") { totalCount } }"#,
        None,
    )
    .await;
    assert_eq!(resp["data"]["allOrders"]["totalCount"], 2);
}
