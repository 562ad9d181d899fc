use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Sample catalog for local development
        manager
            .get_connection()
            .execute_unprepared(r#"
            INSERT INTO products (
                id, name, category, price, description, short_description, meta_description,
                image, rating, is_featured, stock_quantity, created_at, updated_at
            )
            VALUES
                (
                    1, 'Handwoven Wool Rug', 'home', 189.00,
                    'A thick handwoven rug made from undyed highland wool.',
                    'Undyed highland wool rug', 'Handwoven wool rug in natural tones',
                    'products/wool-rug.jpg', 4.8, true, 12, NOW(), NOW()
                ),
                (
                    2, 'Ceramic Pour-Over Set', 'kitchen', 54.50,
                    'Stoneware dripper and carafe, glazed by hand.',
                    'Hand-glazed stoneware dripper', 'Ceramic pour-over coffee set',
                    'products/pour-over.jpg', 4.6, true, 0, NOW(), NOW()
                ),
                (
                    3, 'Linen Apron', 'kitchen', 32.00,
                    'Washed linen apron with cross-back straps.',
                    'Cross-back linen apron', 'Washed linen apron',
                    NULL, 4.1, false, 40, NOW(), NOW()
                ),
                (
                    4, 'Brass Desk Lamp', 'home', 129.99,
                    'Adjustable brass lamp with a linen shade.',
                    'Adjustable brass lamp', 'Brass desk lamp with linen shade',
                    'products/brass-lamp.jpg', 4.8, true, 7, NOW(), NOW()
                )
            ON CONFLICT (id) DO NOTHING
            "#)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(r#"
            INSERT INTO product_images (id, product_id, image, is_primary, alt_text)
            VALUES
                (1, 1, 'products/wool-rug.jpg', true, 'Wool rug, top view'),
                (2, 1, 'products/wool-rug-detail.jpg', false, 'Close-up of the weave'),
                (3, 4, 'products/brass-lamp.jpg', true, 'Brass lamp on a desk')
            ON CONFLICT (id) DO NOTHING
            "#)
            .await?;

        // Explicit ids above leave the sequences behind
        manager
            .get_connection()
            .execute_unprepared(
                "SELECT setval(pg_get_serial_sequence('products', 'id'), (SELECT MAX(id) FROM products))",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "SELECT setval(pg_get_serial_sequence('product_images', 'id'), (SELECT MAX(id) FROM product_images))",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DELETE FROM product_images WHERE id IN (1, 2, 3)")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DELETE FROM products WHERE id IN (1, 2, 3, 4)")
            .await?;

        Ok(())
    }
}
