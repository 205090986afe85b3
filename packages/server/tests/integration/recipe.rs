use serde_json::json;

use crate::common::{TestApp, recipe_body, routes};

mod create_and_read {
    use super::*;

    #[tokio::test]
    async fn created_recipe_comes_back_with_category_and_ingredients() {
        let app = TestApp::spawn().await;
        let soups = app.create_category("Soups").await;
        let tomato = app.create_ingredient("Tomato").await;
        let onion = app.create_ingredient("Onion").await;

        let res = app
            .post(
                routes::RECIPES,
                &recipe_body(
                    "Tomato Soup",
                    &soups,
                    &[(&tomato, 400, "g"), (&onion, 1, "pcs")],
                ),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].as_str().is_some());
        assert_eq!(res.body["title"], "Tomato Soup");
        assert_eq!(res.body["category"]["id"], soups.as_str());
        assert_eq!(res.body["category"]["name"], "Soups");
        assert!(res.body["created_at"].as_str().is_some());

        let id = res.id();
        let fetched = app.get(&routes::recipe(&id)).await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.body["prep_time_min"], 10);
        assert_eq!(fetched.body["cook_time_min"], 25);
        assert_eq!(fetched.body["energy"], 320);
        assert_eq!(fetched.body["fat"], 12.5);

        let ingredients = fetched.body["ingredients"].as_array().unwrap();
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[0]["id"], tomato.as_str());
        assert_eq!(ingredients[0]["name"], "Tomato");
        assert_eq!(ingredients[0]["amount"], 400);
        assert_eq!(ingredients[0]["unit"], "g");
        assert_eq!(ingredients[1]["name"], "Onion");
        assert_eq!(ingredients[1]["unit"], "pcs");
    }

    #[tokio::test]
    async fn recipe_without_ingredients_is_allowed() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Drinks").await;

        let res = app
            .post(routes::RECIPES, &recipe_body("Water", &category, &[]))
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["ingredients"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_recipe_returns_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::recipe("does-not-exist")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Soups").await;

        let res = app
            .post(routes::RECIPES, &recipe_body("   ", &category, &[]))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn duplicate_ingredient_in_one_request_is_rejected() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Soups").await;
        let tomato = app.create_ingredient("Tomato").await;

        let res = app
            .post(
                routes::RECIPES,
                &recipe_body("Soup", &category, &[(&tomato, 1, "g"), (&tomato, 2, "g")]),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::RECIPES, &json!({"title": "No category"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod atomicity {
    use sea_orm::{EntityTrait, PaginatorTrait};
    use server::entity::{recipe, recipe_ingredient};

    use super::*;

    async fn row_counts(app: &TestApp) -> (u64, u64) {
        let recipes = recipe::Entity::find().count(&app.db).await.unwrap();
        let lines = recipe_ingredient::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        (recipes, lines)
    }

    #[tokio::test]
    async fn unknown_ingredient_leaves_no_rows_behind() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Soups").await;
        let tomato = app.create_ingredient("Tomato").await;

        let res = app
            .post(
                routes::RECIPES,
                &recipe_body(
                    "Tomato Soup",
                    &category,
                    &[(&tomato, 400, "g"), ("no-such-ingredient", 1, "pcs")],
                ),
            )
            .await;

        assert_eq!(res.status, 409, "{}", res.text);
        assert_eq!(res.body["code"], "CONFLICT");
        assert_eq!(row_counts(&app).await, (0, 0));
    }

    #[tokio::test]
    async fn unknown_category_is_a_conflict() {
        let app = TestApp::spawn().await;
        let tomato = app.create_ingredient("Tomato").await;

        let res = app
            .post(
                routes::RECIPES,
                &recipe_body("Tomato Soup", "no-such-category", &[(&tomato, 1, "g")]),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(row_counts(&app).await, (0, 0));
    }

    #[tokio::test]
    async fn failed_update_keeps_previous_state() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Soups").await;
        let tomato = app.create_ingredient("Tomato").await;
        let id = app
            .create_recipe("Tomato Soup", &category, &[(&tomato, 400, "g")])
            .await;

        let res = app
            .put(
                &routes::recipe(&id),
                &recipe_body("Renamed", &category, &[("no-such-ingredient", 1, "g")]),
            )
            .await;
        assert_eq!(res.status, 409);

        let fetched = app.get(&routes::recipe(&id)).await;
        assert_eq!(fetched.body["title"], "Tomato Soup");
        let ingredients = fetched.body["ingredients"].as_array().unwrap();
        assert_eq!(ingredients.len(), 1);
        assert_eq!(ingredients[0]["amount"], 400);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn update_replaces_fields_and_ingredient_set() {
        let app = TestApp::spawn().await;
        let soups = app.create_category("Soups").await;
        let mains = app.create_category("Mains").await;
        let tomato = app.create_ingredient("Tomato").await;
        let onion = app.create_ingredient("Onion").await;
        let garlic = app.create_ingredient("Garlic").await;
        let id = app
            .create_recipe(
                "Tomato Soup",
                &soups,
                &[(&tomato, 400, "g"), (&onion, 1, "pcs")],
            )
            .await;

        let mut body = recipe_body("Garlic Stew", &mains, &[(&garlic, 3, "cloves")]);
        body["energy"] = json!(500);
        let res = app.put(&routes::recipe(&id), &body).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let fetched = app.get(&routes::recipe(&id)).await;
        assert_eq!(fetched.body["title"], "Garlic Stew");
        assert_eq!(fetched.body["energy"], 500);
        assert_eq!(fetched.body["category"]["name"], "Mains");
        let ingredients = fetched.body["ingredients"].as_array().unwrap();
        assert_eq!(ingredients.len(), 1);
        assert_eq!(ingredients[0]["id"], garlic.as_str());
        assert_eq!(ingredients[0]["unit"], "cloves");
    }

    #[tokio::test]
    async fn empty_ingredient_list_clears_all_lines() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Soups").await;
        let tomato = app.create_ingredient("Tomato").await;
        let id = app
            .create_recipe("Tomato Soup", &category, &[(&tomato, 400, "g")])
            .await;

        let res = app
            .put(&routes::recipe(&id), &recipe_body("Tomato Soup", &category, &[]))
            .await;
        assert_eq!(res.status, 204);

        let fetched = app.get(&routes::recipe(&id)).await;
        assert_eq!(fetched.body["ingredients"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn update_keeps_creation_timestamp() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Soups").await;
        let id = app.create_recipe("Tomato Soup", &category, &[]).await;
        let before = app.get(&routes::recipe(&id)).await;

        let res = app
            .put(&routes::recipe(&id), &recipe_body("Tomato Bisque", &category, &[]))
            .await;
        assert_eq!(res.status, 204);

        let after = app.get(&routes::recipe(&id)).await;
        assert_eq!(after.body["title"], "Tomato Bisque");
        assert_eq!(after.body["created_at"], before.body["created_at"]);
    }

    #[tokio::test]
    async fn updating_a_missing_recipe_returns_404() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Soups").await;

        let res = app
            .put(&routes::recipe("missing"), &recipe_body("Ghost", &category, &[]))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod listing {
    use super::*;

    fn titles(body: &serde_json::Value) -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|r| r["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn search_matches_title_or_ingredient_once_each() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Everyday").await;
        let tomato = app.create_ingredient("Cherry Tomato").await;
        let also_tomato = app.create_ingredient("Tomato Paste").await;
        let flour = app.create_ingredient("Flour").await;

        app.create_recipe("Tomato Soup", &category, &[(&flour, 10, "g")])
            .await;
        app.create_recipe(
            "Summer Salad",
            &category,
            &[(&tomato, 200, "g"), (&also_tomato, 1, "tbsp")],
        )
        .await;
        app.create_recipe("Bread", &category, &[(&flour, 500, "g")])
            .await;

        let res = app
            .get_with_query(routes::RECIPES, &[("search", "TOMATO")])
            .await;

        assert_eq!(res.status, 200);
        let mut found = titles(&res.body);
        found.sort();
        assert_eq!(found, vec!["Summer Salad", "Tomato Soup"]);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Everyday").await;
        app.create_recipe("100% Rye", &category, &[]).await;
        app.create_recipe("Rye Crackers", &category, &[]).await;

        let res = app
            .get_with_query(routes::RECIPES, &[("search", "100%")])
            .await;

        assert_eq!(titles(&res.body), vec!["100% Rye"]);
    }

    #[tokio::test]
    async fn category_filter_lists_newest_first() {
        let app = TestApp::spawn().await;
        let soups = app.create_category("Soups").await;
        let desserts = app.create_category("Desserts").await;

        app.create_recipe("Borscht", &soups, &[]).await;
        app.create_recipe("Cheesecake", &desserts, &[]).await;
        app.create_recipe("Minestrone", &soups, &[]).await;

        let res = app
            .get_with_query(routes::RECIPES, &[("category_id", soups.as_str())])
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(titles(&res.body), vec!["Minestrone", "Borscht"]);
        for recipe in res.body.as_array().unwrap() {
            assert_eq!(recipe["category"]["name"], "Soups");
        }
    }

    #[tokio::test]
    async fn search_and_category_combine() {
        let app = TestApp::spawn().await;
        let soups = app.create_category("Soups").await;
        let mains = app.create_category("Mains").await;
        app.create_recipe("Tomato Soup", &soups, &[]).await;
        app.create_recipe("Tomato Pasta", &mains, &[]).await;

        let res = app
            .get_with_query(
                routes::RECIPES,
                &[("search", "tomato"), ("category_id", mains.as_str())],
            )
            .await;

        assert_eq!(titles(&res.body), vec!["Tomato Pasta"]);
    }

    #[tokio::test]
    async fn empty_search_lists_everything() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Everyday").await;
        app.create_recipe("Bread", &category, &[]).await;
        app.create_recipe("Butter", &category, &[]).await;

        let res = app.get_with_query(routes::RECIPES, &[("search", "")]).await;

        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn whitespace_search_is_a_real_filter() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Everyday").await;
        app.create_recipe("Tomato Soup", &category, &[]).await;
        app.create_recipe("Bread", &category, &[]).await;

        let res = app.get_with_query(routes::RECIPES, &[("search", " ")]).await;

        assert_eq!(titles(&res.body), vec!["Tomato Soup"]);
    }

    #[tokio::test]
    async fn search_folds_case_the_same_way_on_both_sides() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Everyday").await;
        let feta = app.create_ingredient("ΤΥΡΟΣ").await;
        app.create_recipe("ΧΟΡΤΟΣ", &category, &[]).await;
        app.create_recipe("Greek Salad", &category, &[(&feta, 100, "g")])
            .await;
        app.create_recipe("Bread", &category, &[]).await;

        let by_title = app
            .get_with_query(routes::RECIPES, &[("search", "ΧΟΡΤΟΣ")])
            .await;
        assert_eq!(titles(&by_title.body), vec!["ΧΟΡΤΟΣ"]);

        let by_ingredient = app
            .get_with_query(routes::RECIPES, &[("search", "ΤΥΡΟΣ")])
            .await;
        assert_eq!(titles(&by_ingredient.body), vec!["Greek Salad"]);
    }
}

mod delete {
    use sea_orm::{EntityTrait, PaginatorTrait};
    use server::entity::recipe_ingredient;

    use super::*;

    #[tokio::test]
    async fn delete_removes_recipe_and_lines() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Soups").await;
        let tomato = app.create_ingredient("Tomato").await;
        let id = app
            .create_recipe("Tomato Soup", &category, &[(&tomato, 400, "g")])
            .await;

        let res = app.delete(&routes::recipe(&id)).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get(&routes::recipe(&id)).await.status, 404);
        let lines = recipe_ingredient::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(lines, 0);

        // The ingredient itself survives.
        assert_eq!(app.get(&routes::ingredient(&tomato)).await.status, 200);
    }

    #[tokio::test]
    async fn deleting_a_missing_recipe_returns_404() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::recipe("missing")).await;

        assert_eq!(res.status, 404);
    }
}

mod service {
    use server::domain::{Recipe, RecipeIngredientLine};
    use server::error::{CatalogError, ConstraintKind};

    use super::*;

    fn recipe(title: &str, category_id: &str) -> Recipe {
        Recipe {
            id: String::new(),
            title: title.to_string(),
            category_id: category_id.to_string(),
            prep_time_min: 5,
            cook_time_min: 5,
            method: "Mix.".to_string(),
            image_url: None,
            energy: 100,
            fat: 1.0,
            protein: 2.0,
            created_at: Default::default(),
        }
    }

    fn line(ingredient_id: &str, amount: i32) -> RecipeIngredientLine {
        RecipeIngredientLine {
            ingredient_id: ingredient_id.to_string(),
            amount,
            unit: "g".to_string(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamp() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Salads").await;
        let cucumber = app.create_ingredient("Cucumber").await;

        let aggregate = app
            .services
            .recipes
            .create_with_ingredients(recipe("Salad", &category), vec![line(&cucumber, 150)])
            .await
            .unwrap();

        assert!(!aggregate.recipe.id.is_empty());
        assert_ne!(aggregate.recipe.created_at, chrono::DateTime::<chrono::Utc>::default());
        assert_eq!(aggregate.category.name, "Salads");
        assert_eq!(aggregate.ingredients.len(), 1);
        assert_eq!(aggregate.ingredients[0].ingredient.name, "Cucumber");
        assert_eq!(aggregate.ingredients[0].amount, 150);
    }

    #[tokio::test]
    async fn constraint_violation_keeps_its_kind() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Salads").await;

        let err = app
            .services
            .recipes
            .create_with_ingredients(recipe("Salad", &category), vec![line("ghost", 1)])
            .await
            .unwrap_err();

        assert!(err.is_constraint_violation());
        assert!(matches!(
            err,
            CatalogError::ConstraintViolation {
                kind: ConstraintKind::ForeignKey,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn update_of_missing_recipe_is_not_found() {
        let app = TestApp::spawn().await;
        let category = app.create_category("Salads").await;
        let mut missing = recipe("Salad", &category);
        missing.id = "missing".to_string();

        let err = app
            .services
            .recipes
            .update_with_ingredients(missing, vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::NotFound(_)));
    }
}
