//! End-to-end tests for `autogenerate_migration`.
//!
//! Each test builds a current and a desired snapshot, runs the full
//! diff + generate pipeline and checks the rendered PostgreSQL.

use automigrate_core::prelude::*;

// =============================================================================
// Helpers
// =============================================================================

fn users_v1() -> TableDescriptor {
    TableDescriptor::new("users")
        .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
        .column(ColumnDescriptor::new("email", "VARCHAR(255)").not_null())
}

fn position(statements: &[String], needle: &str) -> usize {
    statements
        .iter()
        .position(|s| s.contains(needle))
        .unwrap_or_else(|| panic!("no statement contains {needle:?} in {statements:#?}"))
}

fn sorted(mut statements: Vec<String>) -> Vec<String> {
    statements.sort();
    statements
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn create_table_from_empty() {
    let desired = Snapshot::new().with_table(
        TableDescriptor::new("users")
            .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
            .column(
                ColumnDescriptor::new("email", "VARCHAR(255)")
                    .not_null()
                    .unique(),
            )
            .index(IndexDescriptor::new("idx_users_email", ["email"]).unique()),
    );

    let result = autogenerate_migration(&Snapshot::new(), &desired).unwrap();

    assert!(result.has_changes);
    for needle in [
        "CREATE TABLE",
        "\"id\"",
        "\"email\"",
        "PRIMARY KEY",
        "UNIQUE",
        "NOT NULL",
        "CREATE UNIQUE INDEX",
        "\"idx_users_email\"",
    ] {
        assert!(result.up.contains(needle), "up is missing {needle}: {}", result.up);
    }
    assert!(result.down.contains("DROP TABLE \"users\" CASCADE"));
}

#[test]
fn add_nullable_column() {
    let current = Snapshot::new().with_table(users_v1());
    let desired = Snapshot::new().with_table(users_v1().column(ColumnDescriptor::new("name", "TEXT")));

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert!(result.has_changes);
    assert_eq!(result.up, "ALTER TABLE \"users\" ADD COLUMN \"name\" TEXT");
    assert_eq!(result.down, "ALTER TABLE \"users\" DROP COLUMN \"name\"");
}

#[test]
fn type_changes_render_and_reverse() {
    let current = Snapshot::new().with_table(
        TableDescriptor::new("users")
            .column(ColumnDescriptor::new("bio", "VARCHAR"))
            .column(ColumnDescriptor::new("age", "INTEGER")),
    );
    let desired = Snapshot::new().with_table(
        TableDescriptor::new("users")
            .column(ColumnDescriptor::new("bio", "TEXT"))
            .column(ColumnDescriptor::new("age", "BIGINT")),
    );

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(
        result.up_statements,
        vec![
            "ALTER TABLE \"users\" ALTER COLUMN \"bio\" TYPE TEXT",
            "ALTER TABLE \"users\" ALTER COLUMN \"age\" TYPE BIGINT",
        ]
    );
    assert_eq!(
        result.down_statements,
        vec![
            "ALTER TABLE \"users\" ALTER COLUMN \"age\" TYPE INTEGER",
            "ALTER TABLE \"users\" ALTER COLUMN \"bio\" TYPE VARCHAR",
        ]
    );
}

#[test]
fn nullability_flips_in_both_directions() {
    let current = Snapshot::new().with_table(
        TableDescriptor::new("users")
            .column(ColumnDescriptor::new("email", "TEXT").not_null())
            .column(ColumnDescriptor::new("phone", "TEXT")),
    );
    let desired = Snapshot::new().with_table(
        TableDescriptor::new("users")
            .column(ColumnDescriptor::new("email", "TEXT"))
            .column(ColumnDescriptor::new("phone", "TEXT").not_null()),
    );

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(
        result.up_statements,
        vec![
            "ALTER TABLE \"users\" ALTER COLUMN \"email\" DROP NOT NULL",
            "ALTER TABLE \"users\" ALTER COLUMN \"phone\" SET NOT NULL",
        ]
    );
    assert_eq!(
        result.down_statements,
        vec![
            "ALTER TABLE \"users\" ALTER COLUMN \"phone\" DROP NOT NULL",
            "ALTER TABLE \"users\" ALTER COLUMN \"email\" SET NOT NULL",
        ]
    );
}

#[test]
fn dropped_table_has_placeholder_down() {
    let current = Snapshot::new().with_table(
        TableDescriptor::new("old_table").column(ColumnDescriptor::new("id", "SERIAL").primary_key()),
    );

    let result = autogenerate_migration(&current, &Snapshot::new()).unwrap();

    assert!(result.has_changes);
    assert_eq!(result.up, "DROP TABLE \"old_table\" CASCADE");
    assert!(result.down.contains("Cannot auto-generate"));
    assert!(result.down.contains("\"old_table\""));
    assert!(result.down.starts_with("--"));
}

#[test]
fn identical_snapshots_produce_nothing() {
    let schema = Snapshot::new().with_table(
        users_v1()
            .column(ColumnDescriptor::new("active", "BOOLEAN").default_expr("TRUE"))
            .index(IndexDescriptor::new("idx_users_email", ["email"]).unique()),
    );

    let result = autogenerate_migration(&schema, &schema.clone()).unwrap();

    assert!(!result.has_changes);
    assert_eq!(result.up, "");
    assert_eq!(result.down, "");
    assert!(result.changes.is_empty());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn type_change_does_not_touch_nullability_or_default() {
    let current = Snapshot::new().with_table(
        TableDescriptor::new("t").column(
            ColumnDescriptor::new("n", "INTEGER")
                .not_null()
                .default_expr("0"),
        ),
    );
    let desired = Snapshot::new().with_table(
        TableDescriptor::new("t").column(
            ColumnDescriptor::new("n", "BIGINT")
                .not_null()
                .default_expr("0"),
        ),
    );

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(result.up_statements.len(), 1);
    assert!(!result.up.contains("NOT NULL"));
    assert!(!result.up.contains("DEFAULT"));
}

#[test]
fn default_change_does_not_touch_type_or_nullability() {
    let current = Snapshot::new()
        .with_table(TableDescriptor::new("t").column(ColumnDescriptor::new("s", "TEXT").default_expr("'a'")));
    let desired = Snapshot::new()
        .with_table(TableDescriptor::new("t").column(ColumnDescriptor::new("s", "TEXT").default_expr("'b'")));

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(result.up, "ALTER TABLE \"t\" ALTER COLUMN \"s\" SET DEFAULT 'b'");
    assert_eq!(result.down, "ALTER TABLE \"t\" ALTER COLUMN \"s\" SET DEFAULT 'a'");
}

#[test]
fn removed_default_is_restored_by_down() {
    let current = Snapshot::new()
        .with_table(TableDescriptor::new("t").column(ColumnDescriptor::new("s", "TEXT").default_expr("'a'")));
    let desired = Snapshot::new().with_table(TableDescriptor::new("t").column(ColumnDescriptor::new("s", "TEXT")));

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(result.up, "ALTER TABLE \"t\" ALTER COLUMN \"s\" DROP DEFAULT");
    assert_eq!(result.down, "ALTER TABLE \"t\" ALTER COLUMN \"s\" SET DEFAULT 'a'");
}

#[test]
fn dropped_column_is_recreated_from_its_descriptor() {
    let current = Snapshot::new().with_table(
        users_v1().column(
            ColumnDescriptor::new("score", "NUMERIC(10,2)")
                .not_null()
                .default_expr("0"),
        ),
    );
    let desired = Snapshot::new().with_table(users_v1());

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(result.up, "ALTER TABLE \"users\" DROP COLUMN \"score\"");
    assert_eq!(
        result.down,
        "ALTER TABLE \"users\" ADD COLUMN \"score\" NUMERIC(10,2) NOT NULL DEFAULT 0"
    );
}

#[test]
fn constraint_and_index_drops_precede_column_drops() {
    let current = Snapshot::new()
        .with_table(TableDescriptor::new("users").column(ColumnDescriptor::new("id", "SERIAL").primary_key()))
        .with_table(
            TableDescriptor::new("posts")
                .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
                .column(ColumnDescriptor::new("author_id", "INTEGER").not_null())
                .index(IndexDescriptor::new("idx_posts_author", ["author_id"]))
                .foreign_key(
                    ForeignKeyDescriptor::new("fk_posts_author", ["author_id"], "users", ["id"])
                        .on_delete("CASCADE"),
                ),
        );
    let desired = Snapshot::new()
        .with_table(TableDescriptor::new("users").column(ColumnDescriptor::new("id", "SERIAL").primary_key()))
        .with_table(TableDescriptor::new("posts").column(ColumnDescriptor::new("id", "SERIAL").primary_key()));

    let result = autogenerate_migration(&current, &desired).unwrap();
    let up = &result.up_statements;

    let drop_fk = position(up, "DROP CONSTRAINT \"fk_posts_author\"");
    let drop_idx = position(up, "DROP INDEX \"idx_posts_author\"");
    let drop_col = position(up, "DROP COLUMN \"author_id\"");
    assert!(drop_fk < drop_idx);
    assert!(drop_idx < drop_col);

    // Down recreates the column before indexing and constraining it.
    let down = &result.down_statements;
    let add_col = position(down, "ADD COLUMN \"author_id\"");
    let add_idx = position(down, "CREATE INDEX \"idx_posts_author\"");
    let add_fk = position(down, "ADD CONSTRAINT \"fk_posts_author\"");
    assert!(add_col < add_idx);
    assert!(add_idx < add_fk);
    assert!(down[add_fk].ends_with("ON DELETE CASCADE ON UPDATE NO ACTION"));
}

#[test]
fn down_mirrors_reverse_diff_for_alterations() {
    let a = Snapshot::new()
        .with_table(TableDescriptor::new("teams").column(ColumnDescriptor::new("id", "SERIAL").primary_key()))
        .with_table(
            TableDescriptor::new("users")
                .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
                .column(ColumnDescriptor::new("email", "VARCHAR(255)").not_null().unique())
                .column(ColumnDescriptor::new("bio", "TEXT"))
                .column(ColumnDescriptor::new("age", "INTEGER").default_expr("0"))
                .column(ColumnDescriptor::new("team_id", "INTEGER"))
                .index(IndexDescriptor::new("idx_users_age", ["age"])),
        );
    let b = Snapshot::new()
        .with_table(TableDescriptor::new("teams").column(ColumnDescriptor::new("id", "SERIAL").primary_key()))
        .with_table(
            TableDescriptor::new("users")
                .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
                .column(ColumnDescriptor::new("email", "TEXT"))
                .column(ColumnDescriptor::new("age", "BIGINT"))
                .column(ColumnDescriptor::new("team_id", "INTEGER"))
                .column(ColumnDescriptor::new("nickname", "TEXT"))
                .index(IndexDescriptor::new("idx_users_nickname", ["nickname"]).using("hash"))
                .foreign_key(ForeignKeyDescriptor::new("fk_users_team", ["team_id"], "teams", ["id"])),
        );

    let forward = autogenerate_migration(&a, &b).unwrap();
    let backward = autogenerate_migration(&b, &a).unwrap();

    assert!(forward.has_changes);
    assert_eq!(
        sorted(forward.down_statements.clone()),
        sorted(backward.up_statements.clone())
    );
    assert_eq!(sorted(forward.up_statements), sorted(backward.down_statements));
}

#[test]
fn add_and_drop_columns_are_symmetric() {
    let a = Snapshot::new().with_table(users_v1().column(ColumnDescriptor::new("legacy", "TEXT")));
    let b = Snapshot::new().with_table(
        users_v1()
            .column(ColumnDescriptor::new("first", "TEXT"))
            .column(ColumnDescriptor::new("second", "INTEGER").not_null()),
    );

    let result = autogenerate_migration(&a, &b).unwrap();

    for column in ["first", "second"] {
        assert!(result.up.contains(&format!("ADD COLUMN \"{column}\"")));
        assert!(result.down.contains(&format!("DROP COLUMN \"{column}\"")));
    }
    assert!(result.up.contains("DROP COLUMN \"legacy\""));
    assert!(result.down.contains("ADD COLUMN \"legacy\" TEXT"));
}

// =============================================================================
// Cross-table ordering and CASCADE
// =============================================================================

#[test]
fn cascade_removes_dependent_foreign_keys_without_extra_statements() {
    let orders = TableDescriptor::new("orders")
        .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
        .column(ColumnDescriptor::new("user_id", "INTEGER"));
    let current = Snapshot::new().with_table(users_v1()).with_table(
        orders
            .clone()
            .foreign_key(ForeignKeyDescriptor::new("fk_orders_user", ["user_id"], "users", ["id"])),
    );
    let desired = Snapshot::new().with_table(orders);

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(result.up, "DROP TABLE \"users\" CASCADE");
    assert_eq!(
        result.down_statements,
        vec![
            "-- Cannot auto-generate CREATE TABLE for \"users\"",
            "-- Foreign keys removed by CASCADE: \"orders\".\"fk_orders_user\"",
        ]
    );
}

#[test]
fn foreign_keys_are_added_after_all_tables_exist() {
    let current = Snapshot::new().with_table(users_v1());
    let desired = Snapshot::new()
        .with_table(
            users_v1()
                .column(ColumnDescriptor::new("team_id", "INTEGER"))
                .foreign_key(ForeignKeyDescriptor::new("fk_users_team", ["team_id"], "teams", ["id"])),
        )
        .with_table(TableDescriptor::new("teams").column(ColumnDescriptor::new("id", "SERIAL").primary_key()));

    let result = autogenerate_migration(&current, &desired).unwrap();
    let up = &result.up_statements;

    let add_col = position(up, "ADD COLUMN \"team_id\"");
    let create = position(up, "CREATE TABLE \"teams\"");
    let add_fk = position(up, "ADD CONSTRAINT \"fk_users_team\"");
    assert!(add_col < create);
    assert!(create < add_fk);

    // Down drops the constraint before the table it points at.
    let down = &result.down_statements;
    assert!(position(down, "DROP CONSTRAINT \"fk_users_team\"") < position(down, "DROP TABLE \"teams\""));
}

#[test]
fn foreign_key_drops_precede_referenced_column_drop_in_other_table() {
    let a = TableDescriptor::new("a")
        .column(ColumnDescriptor::new("id", "SERIAL").primary_key());
    let b = TableDescriptor::new("b")
        .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
        .column(ColumnDescriptor::new("a_code", "TEXT"));
    let current = Snapshot::new()
        .with_table(a.clone().column(ColumnDescriptor::new("code", "TEXT").unique()))
        .with_table(
            b.clone()
                .foreign_key(ForeignKeyDescriptor::new("fk_b_a", ["a_code"], "a", ["code"])),
        );
    let desired = Snapshot::new().with_table(a).with_table(b);

    let result = autogenerate_migration(&current, &desired).unwrap();

    let up = &result.up_statements;
    assert!(position(up, "DROP CONSTRAINT \"fk_b_a\"") < position(up, "DROP COLUMN \"code\""));

    let down = &result.down_statements;
    assert!(position(down, "ADD COLUMN \"code\"") < position(down, "ADD CONSTRAINT \"fk_b_a\""));
}

#[test]
fn foreign_key_drops_precede_referenced_primary_key_move() {
    let current = Snapshot::new()
        .with_table(
            TableDescriptor::new("a")
                .column(ColumnDescriptor::new("id", "INTEGER").primary_key())
                .column(ColumnDescriptor::new("code", "TEXT").not_null()),
        )
        .with_table(
            TableDescriptor::new("b")
                .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
                .column(ColumnDescriptor::new("a_id", "INTEGER"))
                .foreign_key(ForeignKeyDescriptor::new("fk_b_a", ["a_id"], "a", ["id"])),
        );
    let desired = Snapshot::new()
        .with_table(
            TableDescriptor::new("a")
                .column(ColumnDescriptor::new("id", "INTEGER").not_null())
                .column(ColumnDescriptor::new("code", "TEXT").primary_key()),
        )
        .with_table(
            TableDescriptor::new("b")
                .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
                .column(ColumnDescriptor::new("a_id", "INTEGER")),
        );

    let result = autogenerate_migration(&current, &desired).unwrap();

    let up = &result.up_statements;
    assert_eq!(position(up, "DROP CONSTRAINT \"fk_b_a\""), 0);
    assert!(position(up, "DROP CONSTRAINT \"a_pkey\"") < position(up, "ADD CONSTRAINT \"a_pkey\""));

    let down = &result.down_statements;
    assert_eq!(
        position(down, "ADD CONSTRAINT \"fk_b_a\""),
        down.len() - 1,
        "foreign key must be restored last: {down:#?}"
    );
    assert!(position(down, "PRIMARY KEY (\"id\")") < position(down, "ADD CONSTRAINT \"fk_b_a\""));
}

#[test]
fn desired_foreign_key_to_dropped_table_is_rejected() {
    let orders = TableDescriptor::new("orders")
        .column(ColumnDescriptor::new("id", "SERIAL").primary_key())
        .column(ColumnDescriptor::new("user_id", "INTEGER"))
        .foreign_key(ForeignKeyDescriptor::new("fk_orders_user", ["user_id"], "users", ["id"]));
    let current = Snapshot::new().with_table(users_v1()).with_table(orders.clone());
    let desired = Snapshot::new().with_table(orders);

    let err = autogenerate_migration(&current, &desired).unwrap_err();

    assert!(matches!(
        err,
        AutogenError::ReferencesDroppedTable { ref foreign_key, .. } if foreign_key == "fk_orders_user"
    ));
}

#[test]
fn foreign_key_column_count_mismatch_is_rejected() {
    let bad = Snapshot::new().with_table(users_v1()).with_table(
        TableDescriptor::new("orders")
            .column(ColumnDescriptor::new("user_id", "INTEGER"))
            .foreign_key(ForeignKeyDescriptor::new(
                "fk_orders_user",
                ["user_id"],
                "users",
                ["id", "email"],
            )),
    );

    let err = autogenerate_migration(&Snapshot::new(), &bad).unwrap_err();

    assert!(err.to_string().contains("fk_orders_user"));
    assert!(matches!(err, AutogenError::ForeignKeyArityMismatch { columns: 1, referenced_columns: 2, .. }));
}

#[test]
fn drops_come_before_creates() {
    let current = Snapshot::new().with_table(
        TableDescriptor::new("legacy").column(ColumnDescriptor::new("id", "SERIAL").primary_key()),
    );
    let desired = Snapshot::new().with_table(users_v1());

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert!(position(&result.up_statements, "DROP TABLE \"legacy\"") < position(&result.up_statements, "CREATE TABLE \"users\""));
}

// =============================================================================
// Schemas, keys and unique flags
// =============================================================================

#[test]
fn non_default_schema_is_qualified() {
    let desired = Snapshot::new().with_table(
        TableDescriptor::new("events")
            .in_schema("audit")
            .column(ColumnDescriptor::new("id", "BIGSERIAL").primary_key())
            .index(IndexDescriptor::new("idx_events_id", ["id"])),
    );

    let result = autogenerate_migration(&Snapshot::new(), &desired).unwrap();
    assert!(result.up.starts_with("CREATE TABLE \"audit\".\"events\""));
    assert!(result.up.contains("ON \"audit\".\"events\" USING btree"));
    assert_eq!(result.down, "DROP TABLE \"audit\".\"events\" CASCADE");

    let options = AutogenOptions::new().with_default_schema("audit");
    let result =
        autogenerate_migration_with(&Snapshot::new(), &desired, &options, &PostgresDialect::new()).unwrap();
    assert_eq!(result.down, "DROP TABLE \"events\" CASCADE");
}

#[test]
fn public_schema_renders_unqualified() {
    let desired = Snapshot::new().with_table(users_v1().in_schema("public"));
    let result = autogenerate_migration(&Snapshot::new(), &desired).unwrap();
    assert!(result.up.starts_with("CREATE TABLE \"users\" ("));
}

#[test]
fn primary_key_move_uses_pkey_constraint() {
    let current = Snapshot::new().with_table(
        TableDescriptor::new("t")
            .column(ColumnDescriptor::new("id", "INTEGER").primary_key())
            .column(ColumnDescriptor::new("code", "TEXT").not_null()),
    );
    let desired = Snapshot::new().with_table(
        TableDescriptor::new("t")
            .column(ColumnDescriptor::new("id", "INTEGER").not_null())
            .column(ColumnDescriptor::new("code", "TEXT").primary_key()),
    );

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(
        result.up_statements,
        vec![
            "ALTER TABLE \"t\" DROP CONSTRAINT \"t_pkey\"",
            "ALTER TABLE \"t\" ADD CONSTRAINT \"t_pkey\" PRIMARY KEY (\"code\")",
        ]
    );
    assert_eq!(
        result.down_statements,
        vec![
            "ALTER TABLE \"t\" DROP CONSTRAINT \"t_pkey\"",
            "ALTER TABLE \"t\" ADD CONSTRAINT \"t_pkey\" PRIMARY KEY (\"id\")",
        ]
    );
}

#[test]
fn unique_flag_without_index_uses_constraint() {
    let current = Snapshot::new().with_table(users_v1());
    let mut users = users_v1();
    users.columns[1].is_unique = true;
    let desired = Snapshot::new().with_table(users);

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(
        result.up,
        "ALTER TABLE \"users\" ADD CONSTRAINT \"users_email_key\" UNIQUE (\"email\")"
    );
    assert_eq!(
        result.down,
        "ALTER TABLE \"users\" DROP CONSTRAINT \"users_email_key\""
    );
}

#[test]
fn unique_flag_with_index_is_rendered_as_index() {
    let current = Snapshot::new().with_table(users_v1());
    let mut users = users_v1().index(IndexDescriptor::new("idx_users_email", ["email"]).unique());
    users.columns[1].is_unique = true;
    let desired = Snapshot::new().with_table(users);

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(
        result.up,
        "CREATE UNIQUE INDEX \"idx_users_email\" ON \"users\" USING btree (\"email\")"
    );
    assert_eq!(result.down, "DROP INDEX \"idx_users_email\"");
}

// =============================================================================
// Warnings, errors and serialization
// =============================================================================

#[test]
fn rename_hint_does_not_change_output() {
    let current = Snapshot::new().with_table(users_v1().column(ColumnDescriptor::new("name", "TEXT")));
    let desired = Snapshot::new().with_table(users_v1().column(ColumnDescriptor::new("full_name", "TEXT")));

    let with_hints = autogenerate_migration(&current, &desired).unwrap();
    let without_hints = autogenerate_migration_with(
        &current,
        &desired,
        &AutogenOptions::new().without_rename_detection(),
        &PostgresDialect::new(),
    )
    .unwrap();

    assert_eq!(with_hints.up, without_hints.up);
    assert_eq!(with_hints.down, without_hints.down);
    assert!(matches!(
        &with_hints.warnings[..],
        [DiffWarning::PossibleColumnRename { .. }]
    ));
    assert!(without_hints.warnings.is_empty());
}

#[test]
fn duplicate_column_is_rejected() {
    let bad = Snapshot::new().with_table(users_v1().column(ColumnDescriptor::new("email", "TEXT")));
    let err = autogenerate_migration(&bad, &Snapshot::new()).unwrap_err();
    assert_eq!(
        err,
        AutogenError::DuplicateColumn {
            table: "users".into(),
            column: "email".into(),
        }
    );
    assert_eq!(err.to_string(), "Duplicate column 'email' in table 'users'");
}

#[test]
fn foreign_key_to_unknown_table_is_rejected() {
    let bad = Snapshot::new().with_table(
        users_v1().foreign_key(ForeignKeyDescriptor::new("fk_users_org", ["id"], "orgs", ["id"])),
    );
    let err = autogenerate_migration(&Snapshot::new(), &bad).unwrap_err();
    assert!(err.to_string().contains("orgs"));
}

#[test]
fn snapshots_load_from_json() {
    let current: Snapshot = serde_json::from_str(
        r#"[{"name": "users", "columns": [
            {"name": "id", "data_type": "SERIAL", "is_primary_key": true},
            {"name": "email", "data_type": "varchar(255)", "nullable": false}
        ]}]"#,
    )
    .unwrap();
    let desired: Snapshot = serde_json::from_str(
        r#"[{"name": "users", "schema": "public", "columns": [
            {"name": "id", "data_type": "SERIAL", "is_primary_key": true, "nullable": false},
            {"name": "email", "data_type": "VARCHAR(255)", "nullable": false},
            {"name": "created_at", "data_type": "TIMESTAMPTZ", "nullable": false, "default": "now()"}
        ]}]"#,
    )
    .unwrap();

    let result = autogenerate_migration(&current, &desired).unwrap();

    assert_eq!(
        result.up,
        "ALTER TABLE \"users\" ADD COLUMN \"created_at\" TIMESTAMPTZ NOT NULL DEFAULT now()"
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["has_changes"], true);
    assert_eq!(json["changes"][0]["kind"], "add_column");
    assert_eq!(json["changes"][0]["column"]["name"], "created_at");
}
